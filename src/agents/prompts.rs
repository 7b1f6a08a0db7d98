use serde::{Deserialize, Serialize};

pub const SUPERVISOR_PROMPT: &str = r#"You are the supervisor of a small team of agents: an Enhancer, a Researcher and a Coder. Decide which agent should act next, based on the user's request and everything the team has contributed so far.

Team members:
- enhancer: rewrites a vague or incomplete request into a precise, actionable one. Prefer it first when the request is unclear.
- researcher: gathers information from the web and writes up what it finds.
- coder: handles calculations, code, data analysis and other technical problem-solving by running Python.

Review the request and the latest contributions for relevance and completeness, then pick the agent that moves the task forward. Explain your choice in one or two sentences."#;

pub const ENHANCER_PROMPT: &str = r#"You are a query enhancer. Do not ask the user anything.
1. Clarify and refine the user's request.
2. Resolve ambiguities by choosing the most reasonable interpretation.
3. Reply with a more precise and actionable version of the original request, and nothing else."#;

pub const RESEARCHER_PROMPT: &str = r#"You are a researcher. Gather the information needed to answer the request, using web search when facts are required, and write a concise, sourced answer. Do not perform any other kind of task."#;

pub const CODER_PROMPT: &str = r#"You are a coder and analyst. Solve calculations, math questions, data tasks and programming problems. When a result must be computed, write a Python program and run it with the python_exec tool, then state the final result plainly."#;

pub const VALIDATOR_PROMPT: &str = r#"You are the workflow validator. The first message is the user's question and the second is the team's latest answer.
- If the answer satisfactorily addresses the question, choose "FINISH".
- If the answer is wrong, incomplete or off-topic, choose "supervisor" so the team can try again.
Give a short reason for your verdict."#;

/// Instruction text for every node. Any field left out of a config file
/// falls back to the built-in default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub supervisor: String,
    pub enhancer: String,
    pub researcher: String,
    pub coder: String,
    pub validator: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            supervisor: SUPERVISOR_PROMPT.to_string(),
            enhancer: ENHANCER_PROMPT.to_string(),
            researcher: RESEARCHER_PROMPT.to_string(),
            coder: CODER_PROMPT.to_string(),
            validator: VALIDATOR_PROMPT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override() {
        let prompts: Prompts = toml::from_str(r#"coder = "Only answer in hex.""#).unwrap();
        assert_eq!(prompts.coder, "Only answer in hex.");
        assert_eq!(prompts.supervisor, SUPERVISOR_PROMPT);
    }
}
