//! An HTTP-backed advisor against OpenRouter's chat-completions endpoint,
//! grounded in `llm.py`'s `LLMInterface`. Re-expressed as a blocking client
//! since nothing else in this stack runs an async runtime (the tick loop is
//! fully synchronous).

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{json, Value};

use bdi_agent::advisor::{ConversationVerdict, DesireSeed, HistoryTurn, LlmAdvisor, PlanStepKind};
use bdi_agent::belief::BeliefValue;
use bdi_agent::desire::MotivationType;
use bdi_agent::emotion::Emotion;
use bdi_agent::personality::Personality;
use bdi_core::AgentId;
use tracing::warn;

use crate::fallback::FallbackAdvisor;

const API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const MODEL: &str = "openai/gpt-3.5-turbo";
const MAX_TOKENS: u32 = 150;
const TEMPERATURE: f32 = 0.7;

/// Talks to OpenRouter for all four advisor calls (§6). Each of the three
/// structured calls sends a schema-describing prompt and parses the
/// completion as JSON; a request error, a timeout, or a malformed/
/// unparseable body all count as the "transient external failure" tier
/// (§7) and fall through to the bundled [`FallbackAdvisor`] rather than
/// propagating — the fallback is the safety net, never the only path.
pub struct HttpAdvisor {
    client: Client,
    api_key: Option<String>,
    fallback: FallbackAdvisor,
}

impl HttpAdvisor {
    /// `api_key: None` reproduces `llm.py`'s "no `OPENROUTER_API_KEY`" mock
    /// path exactly — every call is answered by the bundled fallback with no
    /// network I/O at all.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("reqwest client builds with no custom TLS config"),
            api_key,
            fallback: FallbackAdvisor,
        }
    }

    fn chat(&self, system_message: &str, prompt: &str) -> Result<String, String> {
        let Some(api_key) = &self.api_key else {
            return Ok(format!("Mock response to: {prompt}"));
        };

        let mut messages = Vec::new();
        if !system_message.is_empty() {
            messages.push(json!({"role": "system", "content": system_message}));
        }
        messages.push(json!({"role": "user", "content": prompt}));

        let body = json!({
            "model": MODEL,
            "messages": messages,
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        });

        let response = self
            .client
            .post(API_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(|e| format!("Error generating response: {e}"))?
            .error_for_status()
            .map_err(|e| format!("Error generating response: {e}"))?;

        let parsed: serde_json::Value = response
            .json()
            .map_err(|e| format!("Error generating response: {e}"))?;

        parsed
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| "Error generating response: malformed completion body".to_string())
    }

    /// Pull the first JSON array or object out of a chat completion, in case
    /// the model wrapped it in prose or a fenced code block.
    fn extract_json(text: &str) -> Result<Value, String> {
        let trimmed = text.trim().trim_start_matches("```json").trim_start_matches("```").trim_end_matches("```");
        if let Ok(v) = serde_json::from_str::<Value>(trimmed.trim()) {
            return Ok(v);
        }
        let start = trimmed.find(|c| c == '[' || c == '{');
        let end = trimmed.rfind(|c| c == ']' || c == '}');
        match (start, end) {
            (Some(s), Some(e)) if e >= s => serde_json::from_str(&trimmed[s..=e])
                .map_err(|err| format!("malformed advisor JSON: {err}")),
            _ => Err("advisor response contained no JSON".to_string()),
        }
    }
}

fn json_to_belief_value(value: &Value) -> Option<BeliefValue> {
    match value {
        Value::String(s) => Some(BeliefValue::Text(s.clone())),
        Value::Number(n) => n.as_f64().map(BeliefValue::Number),
        Value::Bool(b) => Some(BeliefValue::Bool(*b)),
        _ => None,
    }
}

fn parse_motivation_type(s: &str) -> Option<MotivationType> {
    match s.to_uppercase().as_str() {
        "SURVIVAL" => Some(MotivationType::Survival),
        "SAFETY" => Some(MotivationType::Safety),
        "SOCIAL" => Some(MotivationType::Social),
        "ESTEEM" => Some(MotivationType::Esteem),
        "ACHIEVEMENT" => Some(MotivationType::Achievement),
        "CURIOSITY" => Some(MotivationType::Curiosity),
        _ => None,
    }
}

fn parse_plan_step_kind(s: &str) -> Option<PlanStepKind> {
    match s.to_lowercase().as_str() {
        "send_message" => Some(PlanStepKind::SendMessage),
        "wait_for_response" => Some(PlanStepKind::WaitForResponse),
        "end_conversation" => Some(PlanStepKind::EndConversation),
        "respond_to_message" => Some(PlanStepKind::RespondToMessage),
        "initiate_conversation" => Some(PlanStepKind::InitiateConversation),
        "think" => Some(PlanStepKind::Think),
        _ => None,
    }
}

impl LlmAdvisor for HttpAdvisor {
    fn generate_dynamic_desires(
        &self,
        name: &str,
        id: AgentId,
        personality: &Personality,
        emotions: &Emotion,
        social_battery: f32,
        recent_perception_summaries: &[String],
    ) -> Result<Vec<DesireSeed>, String> {
        let system = "You are the desire-generation advisor for a BDI social simulation agent. \
            Reply with ONLY a JSON array of 1-3 objects, each with keys \
            \"description\" (string), \"priority\" (0-1), \"urgency\" (0-1), \
            \"motivation_type\" (one of SURVIVAL, SAFETY, SOCIAL, ESTEEM, ACHIEVEMENT, CURIOSITY), \
            and optional \"context\" (object of string keys to string/number/bool values). \
            No prose, no markdown fence.";
        let prompt = format!(
            "Agent: {name} (id {})\nPersonality: openness={}, conscientiousness={}, \
             extraversion={}, agreeableness={}, neuroticism={}\n\
             Emotions: happiness={}, sadness={}, anger={}, fear={}, loneliness={}\n\
             Social battery: {social_battery}\nRecent perceptions:\n{}",
            id.0,
            personality.openness,
            personality.conscientiousness,
            personality.extraversion,
            personality.agreeableness,
            personality.neuroticism,
            emotions.happiness,
            emotions.sadness,
            emotions.anger,
            emotions.fear,
            emotions.loneliness,
            recent_perception_summaries.join("\n"),
        );

        let text = match self.chat(system, &prompt) {
            Ok(t) => t,
            Err(e) => {
                warn!(agent = id.0, error = %e, "generate_dynamic_desires chat failed, using fallback");
                return self.fallback.generate_dynamic_desires(
                    name,
                    id,
                    personality,
                    emotions,
                    social_battery,
                    recent_perception_summaries,
                )
            }
        };

        let Ok(Value::Array(items)) = Self::extract_json(&text) else {
            warn!(agent = id.0, "generate_dynamic_desires returned unparseable JSON, using fallback");
            return self.fallback.generate_dynamic_desires(
                name,
                id,
                personality,
                emotions,
                social_battery,
                recent_perception_summaries,
            );
        };

        let seeds: Vec<DesireSeed> = items
            .iter()
            .filter_map(|item| {
                let description = item.get("description")?.as_str()?.to_string();
                let priority = item.get("priority")?.as_f64()? as f32;
                let urgency = item.get("urgency")?.as_f64()? as f32;
                let motivation_type = parse_motivation_type(item.get("motivation_type")?.as_str()?)?;
                let context: HashMap<String, BeliefValue> = item
                    .get("context")
                    .and_then(|c| c.as_object())
                    .map(|obj| {
                        obj.iter()
                            .filter_map(|(k, v)| json_to_belief_value(v).map(|bv| (k.clone(), bv)))
                            .collect()
                    })
                    .unwrap_or_default();
                Some(DesireSeed {
                    description,
                    priority: priority.clamp(0.0, 1.0),
                    urgency: urgency.clamp(0.0, 1.0),
                    motivation_type,
                    context,
                })
            })
            .collect();

        if seeds.is_empty() {
            return self.fallback.generate_dynamic_desires(
                name,
                id,
                personality,
                emotions,
                social_battery,
                recent_perception_summaries,
            );
        }
        Ok(seeds)
    }

    fn analyze_conversation_turn(
        &self,
        name: &str,
        id: AgentId,
        personality: &Personality,
        history: &[HistoryTurn],
        social_battery: f32,
    ) -> Result<ConversationVerdict, String> {
        let system = "You classify the state of one agent's side of a conversation. \
            Reply with ONLY one word: CONTINUE, WRAP_UP, or FORCE_QUIT. No punctuation, no prose.";
        let recent = history
            .iter()
            .map(|t| format!("{}: {}", t.sender_name, t.content))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "Agent: {name} (id {})\nPersonality: extraversion={}, agreeableness={}, neuroticism={}\n\
             Social battery: {social_battery}\nConversation so far:\n{recent}",
            id.0,
            personality.extraversion,
            personality.agreeableness,
            personality.neuroticism,
        );

        let text = match self.chat(system, &prompt) {
            Ok(t) => t,
            Err(e) => {
                warn!(agent = id.0, error = %e, "analyze_conversation_turn chat failed, using fallback");
                return self
                    .fallback
                    .analyze_conversation_turn(name, id, personality, history, social_battery)
            }
        };

        match text.trim().trim_matches('"').to_uppercase().as_str() {
            "CONTINUE" => Ok(ConversationVerdict::Continue),
            "WRAP_UP" => Ok(ConversationVerdict::WrapUp),
            "FORCE_QUIT" => Ok(ConversationVerdict::ForceQuit),
            _ => self
                .fallback
                .analyze_conversation_turn(name, id, personality, history, social_battery),
        }
    }

    fn generate_next_plan_step(
        &self,
        name: &str,
        id: AgentId,
        personality: &Personality,
        current_desire_description: &str,
        history: &[HistoryTurn],
        social_battery: f32,
    ) -> Result<Vec<PlanStepKind>, String> {
        let system = "You propose the next 1-2 conversational plan steps for a BDI agent. \
            Reply with ONLY a JSON array of 1-2 strings from: send_message, wait_for_response, \
            end_conversation, respond_to_message, initiate_conversation, think. \
            No prose, no markdown fence.";
        let recent = history
            .iter()
            .map(|t| format!("{}: {}", t.sender_name, t.content))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "Agent: {name} (id {})\nPersonality: extraversion={}, agreeableness={}\n\
             Current goal: {current_desire_description}\nSocial battery: {social_battery}\n\
             Conversation so far:\n{recent}",
            id.0,
            personality.extraversion,
            personality.agreeableness,
        );

        let text = match self.chat(system, &prompt) {
            Ok(t) => t,
            Err(e) => {
                warn!(agent = id.0, error = %e, "generate_next_plan_step chat failed, using fallback");
                return self.fallback.generate_next_plan_step(
                    name,
                    id,
                    personality,
                    current_desire_description,
                    history,
                    social_battery,
                )
            }
        };

        let Ok(Value::Array(items)) = Self::extract_json(&text) else {
            warn!(agent = id.0, "generate_next_plan_step returned unparseable JSON, using fallback");
            return self.fallback.generate_next_plan_step(
                name,
                id,
                personality,
                current_desire_description,
                history,
                social_battery,
            );
        };

        let steps: Vec<PlanStepKind> = items
            .iter()
            .filter_map(|v| v.as_str())
            .filter_map(parse_plan_step_kind)
            .take(2)
            .collect();

        if steps.is_empty() {
            return self.fallback.generate_next_plan_step(
                name,
                id,
                personality,
                current_desire_description,
                history,
                social_battery,
            );
        }
        Ok(steps)
    }

    fn generate_content(
        &self,
        personality: &Personality,
        context: &str,
        history: &[HistoryTurn],
        message_type: &str,
        incoming_content: Option<&str>,
    ) -> Result<String, String> {
        let mut prompt = format!(
            "You are an AI agent with the following personality traits:\n\
             - Openness: {}\n- Conscientiousness: {}\n- Extraversion: {}\n\
             - Agreeableness: {}\n- Neuroticism: {}\n\nContext: {context}\n",
            personality.openness,
            personality.conscientiousness,
            personality.extraversion,
            personality.agreeableness,
            personality.neuroticism,
        );
        if let Some(incoming) = incoming_content {
            prompt.push_str(&format!("Other agent says: {incoming}\n"));
        }
        prompt.push_str(&format!("Generate a short {message_type} response in the style of this agent."));

        if history.is_empty() {
            self.chat("You are an AI agent in a conversation.", &prompt)
        } else {
            let recent = history
                .iter()
                .map(|t| format!("{}: {}", t.sender_name, t.content))
                .collect::<Vec<_>>()
                .join("\n");
            self.chat(
                "You are an AI agent in a conversation.",
                &format!("{prompt}\n\nRecent history:\n{recent}"),
            )
        }
    }
}
