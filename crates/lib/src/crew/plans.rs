//! The two fixed crews: the user-facing project brief and the bot's own self-description.

use super::{AgentSpec, Crew, TaskSpec};
use std::sync::Arc;

/// Kickoff input holding the user's project description.
pub const USER_REQUEST_KEY: &str = "user_request";

/// Kickoff input holding the approved prompt for the self-description crew.
pub const APPROVED_PROMPT_KEY: &str = "approved_prompt";

/// Four stages: research, debate, consolidate into a technical prompt, validate and present.
pub fn project_brief_crew() -> Crew {
    let researcher = Arc::new(AgentSpec::new(
        "Especialista em Pesquisa e Tendências de Mercado",
        "Investigar tendências, tecnologias e soluções existentes relevantes para a demanda de projeto do usuário, fornecendo insights para o debate.",
        "Você é um pesquisador incansável, sempre em busca de informações atualizadas para embasar decisões de projeto e identificar oportunidades.",
    ));
    let strategist = Arc::new(AgentSpec::new(
        "Estrategista de Soluções e Facilitador de Debate",
        "Liderar o debate para conceituar a melhor abordagem técnica e funcional para o projeto do usuário, considerando viabilidade, inovação e escalabilidade.",
        "Com vasta experiência em arquitetura de sistemas e metodologias ágeis, você facilita a discussão e direciona a equipe para soluções eficazes e criativas.",
    ));
    let consolidator = Arc::new(AgentSpec::new(
        "Engenheiro de Prompt e Consolidador de Requisitos",
        "Transformar todas as discussões, pesquisas e debates em um prompt técnico claro, conciso e completo, pronto para ser validado pela equipe externa.",
        "Você é um mestre na arte de resumir e estruturar informações complexas em documentos técnicos de alta qualidade e prompts acionáveis, garantindo que nada essencial seja perdido.",
    ));
    let validator = Arc::new(AgentSpec::new(
        "Analista de Validação Externa e Qualidade de Prompt",
        "Validar a qualidade, clareza e completude do prompt técnico gerado, garantindo que ele atenda à demanda original do usuário e esteja pronto para a equipe de execução.",
        "Seu foco é a qualidade e a experiência do usuário final. Você garante que o prompt seja compreensível, útil e alinhado com as expectativas do cliente para quem vai executá-lo, identificando falhas e sugerindo aprimoramentos.",
    ));

    Crew::new("project-brief")
        .stage(
            researcher,
            TaskSpec::new(
                "{user_request} - Pesquisar e coletar informações relevantes sobre a demanda do usuário. Identifique os requisitos funcionais e não-funcionais, tecnologias mencionadas e desafios potenciais. Prepare um resumo para o debate.",
                "Um resumo detalhado da demanda do usuário, incluindo pontos chave, tecnologias, escopo inicial e quaisquer incertezas a serem discutidas.",
            ),
        )
        .stage(
            strategist,
            TaskSpec::new(
                "Com base na pesquisa da demanda e em conhecimentos técnicos, debata as melhores abordagens e soluções técnicas para o projeto do usuário. O objetivo é conceituar a estrutura do projeto, tecnologias principais e um plano de alto nível, considerando viabilidade, inovação e escalabilidade.",
                "Um rascunho de plano de projeto de alto nível, com a estrutura da solução, tecnologias principais debatidas e possíveis alternativas.",
            ),
        )
        .stage(
            consolidator,
            TaskSpec::new(
                "Consolidar os resultados da pesquisa e do debate em um *prompt técnico detalhado*. Este prompt deve ser um guia claro e acionável para a equipe de execução, incluindo: visão geral do projeto, requisitos funcionais, requisitos técnicos, tecnologias sugeridas, e a estrutura de módulos/componentes.",
                "Um prompt técnico completo e bem estruturado, pronto para ser validado, contendo todos os detalhes essenciais para iniciar o desenvolvimento (formato Markdown).",
            ),
        )
        .stage(
            validator,
            TaskSpec::new(
                "Revise o prompt técnico final gerado a partir da demanda '{user_request}'. Valide sua clareza, completude, alinhamento com a demanda original do usuário, e se ele está pronto para ser entregue à equipe de execução. Formate a saída para uma apresentação amigável e concisa ao usuário do WhatsApp, incluindo um resumo do plano e indicando que ele foi validado, além de mencionar os próximos passos (que a equipe de execução vai trabalhar nisso). Se houver correções, inclua-as de forma clara. Mantenha a resposta concisa para WhatsApp.",
                "O prompt técnico final validado ou um relatório conciso com sugestões de correção. O output deve ser direto para o usuário do WhatsApp, com um resumo do plano e os próximos passos claros.",
            ),
        )
}

/// Description of the bot itself, fed to [`self_description_crew`] at startup.
pub const BOT_APPROVED_PROMPT: &str = r#"O projeto a ser desenvolvido é um **"Assistente de Projetos com IA para Profissionais no WhatsApp"**. Este bot tem como objetivo principal ajudar profissionais a conceituar e planejar seus projetos de software ou IA, passando por um processo colaborativo e validado.

**Fluxo de Interação do Bot com o Usuário (Capacidades Principais):**
1. **Brainstorming & Planejamento:** O bot recebe a descrição do projeto do usuário. Uma equipe interna de agentes de IA composta por um *Pesquisador*, *Estrategista* e *Consolidador* debate e gera um "Prompt Técnico Validado" detalhado para o projeto do usuário.
2. **Validação Externa:** O "Prompt Técnico Validado" é então analisado por um *Validador Externo* que garante sua clareza, completude e alinhamento com a demanda original do usuário, antes de ser apresentado.
3. **Simulação de Execução:** O bot informa ao usuário que o "Prompt Técnico Validado" seria então entregue a uma "Equipe de Execução" (conceitual neste MVP) que desenvolveria back-end, front-end e faria a validação.
4. **Canal Aberto para Dúvidas e Suporte:** Após a entrega do prompt, o bot oferece suporte contínuo para tirar dúvidas, ajudar na execução local, corrigir erros e fornecer recursos (links, docs).

**Requisitos Chave do Bot (como sistema):**
1. **Interface WhatsApp:** Receber e enviar mensagens via Twilio.
2. **Orquestração de IA:** Agentes especializados colaborando em sequência para planejar projetos.
3. **Geração de Prompt Técnico:** A saída principal do bot deve ser um prompt técnico detalhado e validado para o projeto do usuário.
4. **Suporte Interativo:** Capacidade de responder a perguntas de acompanhamento sobre o plano ou execução.
5. **Privacidade Total:** Nenhuma mensagem ou dado do usuário será armazenado em disco. O processamento é em memória.

**Tecnologias Esperadas para o Bot:** Rust (axum, tokio), Google Gemini API, Twilio WhatsApp API."#;

/// Six stages describing the bot: requirements, architecture, back end, front end, QA, documentation.
pub fn self_description_crew() -> Crew {
    const BOT: &str = "\"Assistente de Projetos com IA para WhatsApp\"";

    let requirements = Arc::new(AgentSpec::new(
        "Engenheiro de Requisitos de Software",
        "Traduzir requisitos do projeto do bot em funcionalidades e especificações claras.",
        "Você é um engenheiro de requisitos experiente em transformar conceitos de bots de IA em especificações técnicas detalhadas.",
    ));
    let architect = Arc::new(AgentSpec::new(
        "Arquiteto de Software e IA",
        "Definir a arquitetura técnica do bot, suas interações com LLMs e APIs.",
        "Com anos de experiência em engenharia de software e IA, você estrutura soluções escaláveis e eficientes para bots conversacionais.",
    ));
    let backend = Arc::new(AgentSpec::new(
        "Desenvolvedor Back-End do Bot",
        "Desenvolver a lógica de comunicação, orquestração dos agentes e integração com as APIs da Twilio e do Google Gemini.",
        "Você é um desenvolvedor focado na criação de APIs robustas e lógica de negócio para bots de IA.",
    ));
    let frontend = Arc::new(AgentSpec::new(
        "Desenvolvedor Front-End de Interface de Teste",
        "Criar interfaces de teste e mensagens iniciais amigáveis para o bot.",
        "Especialista em experiências digitais, você transforma funcionalidades em interfaces bonitas e intuitivas, e mensagens claras para o usuário.",
    ));
    let qa = Arc::new(AgentSpec::new(
        "Validador QA do Bot",
        "Validar se o bot atende aos requisitos de funcionalidade, privacidade e usabilidade.",
        "Você é um analista de qualidade com olhar atento para erros e inconsistências em bots de IA.",
    ));
    let docs = Arc::new(AgentSpec::new(
        "Documentador e Suporte de Conhecimento do Bot",
        "Documentar as funcionalidades do bot e preparar guias de uso/solução de problemas internos.",
        "Você é essencial para garantir que o conhecimento sobre o bot esteja acessível e que ele possa ser mantido e aprimorado.",
    ));

    Crew::new("self-description")
        .stage(
            requirements,
            TaskSpec::new(
                format!("Analisar o prompt que define o {BOT} e extrair seus requisitos, funcionalidades e fluxo de interação.\n\nPrompt aprovado:\n{{approved_prompt}}"),
                format!("Lista detalhada de requisitos e funcionalidades para o {BOT}."),
            ),
        )
        .stage(
            architect,
            TaskSpec::new(
                format!("Propor a arquitetura do {BOT}, incluindo tecnologias, camadas da aplicação e como a equipe de agentes se integrará com Twilio e Gemini."),
                format!("Documento de arquitetura detalhado para o {BOT}."),
            ),
        )
        .stage(
            backend,
            TaskSpec::new(
                format!("Desenvolver o back-end do {BOT} conforme os requisitos e arquitetura definidos, focando na orquestração dos agentes e na API do WhatsApp."),
                format!("Código-fonte completo do back-end para o {BOT}."),
            ),
        )
        .stage(
            frontend,
            TaskSpec::new(
                format!("Criar as mensagens de boas-vindas e orientação para o {BOT} e definir uma interface de teste conceitual se aplicável."),
                "Textos das mensagens de interação do bot e plano conceitual para interface de teste.",
            ),
        )
        .stage(
            qa,
            TaskSpec::new(
                format!("Testar o {BOT} para garantir que suas funcionalidades (brainstorming, validação, suporte) operem conforme o esperado e que a privacidade seja mantida."),
                format!("Relatório de validação detalhado para o {BOT}."),
            ),
        )
        .stage(
            docs,
            TaskSpec::new(
                format!("Compilar FAQ e documentação interna para o uso e manutenção do {BOT}."),
                format!("Documentação interna e FAQ para o {BOT}."),
            ),
        )
}
