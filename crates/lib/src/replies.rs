//! Fixed user-facing texts (Portuguese, WhatsApp markdown) and the support prompt.

/// Reply to greetings and start commands.
pub const WELCOME: &str = "Olá! Sou seu **Assistente de Projetos com IA**. Nossa equipe de especialistas está pronta para te ajudar a conceituar e planejar seu projeto.\n\n\
**Como posso te ajudar hoje?** Por favor, me diga qual a sua ideia de projeto, o problema que você quer resolver, ou se precisa de suporte com algo específico.";

/// Reply to help commands.
pub const HELP: &str = "Claro! Sou seu Assistente de Projetos com IA. Por favor, me diga em que posso te ajudar com mais detalhes. \
Seja para planejar um novo projeto, tirar uma dúvida sobre algo que já geramos, ou para resolver um problema técnico.";

/// Reply to short ideas: asks for the four categories of detail.
pub const CLARIFY: &str = "Entendi sua ideia! Para que nossa equipe de especialistas possa criar um plano robusto, preciso de mais detalhes.\n\n\
**Vamos lá detalhar o problema/ideia:** Por favor, me conte mais sobre:\n\
**1. Qual o problema principal que seu projeto resolve ou a ideia central?**\n\
**2. Quais os objetivos? O que ele deve fazer ou entregar?**\n\
**3. Já pensou em alguma tecnologia (ex: Python, React, mobile)?**\n\
**4. Há alguma restrição importante (prazo, orçamento, privacidade)?**\n\n\
Quanto mais detalhes, melhor! Assim podemos criar um prompt técnico mais acertivo.";

/// Inline acknowledgement while the brief crew runs.
pub const HOLDING: &str = "Aguarde um instante, por favor! Nossos especialistas de IA estão analisando sua demanda e debatendo a melhor abordagem. \
Isso pode levar alguns minutos. Assim que tivermos uma resposta ou o plano inicial, te avisaremos! 😊";

/// Sent instead of the brief when the crew fails or times out.
pub const BRIEF_APOLOGY: &str = "Desculpe, nossa equipe de IA teve um problema ao gerar o plano do seu projeto. \
Por favor, tente novamente com uma descrição um pouco diferente, ou entre em contato com o suporte.";

/// Sent when the support-question LLM call fails.
pub const SUPPORT_FALLBACK: &str = "Desculpe, não consegui responder sua dúvida agora. \
Por favor, tente novamente em alguns instantes ou descreva o problema com mais detalhes.";

/// Last-resort reply when building any inline answer fails unexpectedly.
pub const GENERIC_APOLOGY: &str = "Desculpe, algo deu errado ao processar sua mensagem. Por favor, tente novamente em instantes.";

/// Instruction for the single support-question LLM call, embedding the user's text.
pub fn support_prompt(user_message: &str) -> String {
    format!(
        "Como Assistente de Projetos com IA, o usuário perguntou: '{}'. \
Responda de forma concisa e útil, oferecendo ajuda na execução, correção ou fornecendo recursos \
(links, documentação, tutoriais), se aplicável. O usuário está interagindo via WhatsApp, então a \
resposta deve ser direta e em português. Lembre-se que você é um consultor de execução de projetos.",
        user_message
    )
}
