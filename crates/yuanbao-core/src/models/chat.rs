use std::fmt;

use serde::{Deserialize, Serialize};

/// Internal model name sent in the `model` field. The service routes on
/// `chatModelId`; this value is fixed for every web chat.
const WIRE_MODEL: &str = "gpt_175B_0404";

/// Plugin mode used by the web client.
const PLUGIN: &str = "Adaptive";

/// Agent ID of the default Yuanbao assistant.
const AGENT_ID: &str = "naQivTmsDa";

/// Function flag that enables web search for a single message.
const INTERNET_SEARCH_FUNCTION: &str = "supportInternetSearch";

/// Models selectable through `chatModelId`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatModel {
    #[default]
    DeepSeekV3,
    DeepSeekR1,
    Hunyuan,
    HunyuanT1,
}

impl ChatModel {
    pub const ALL: [ChatModel; 4] = [
        ChatModel::DeepSeekV3,
        ChatModel::DeepSeekR1,
        ChatModel::Hunyuan,
        ChatModel::HunyuanT1,
    ];

    /// Local name, as accepted on the command line and in config.
    pub fn name(self) -> &'static str {
        match self {
            ChatModel::DeepSeekV3 => "deep_seek_v3",
            ChatModel::DeepSeekR1 => "deep_seek_r1",
            ChatModel::Hunyuan => "hunyuan",
            ChatModel::HunyuanT1 => "hunyuan_t1",
        }
    }

    /// Value of `chatModelId` on the wire.
    pub fn wire_id(self) -> &'static str {
        match self {
            ChatModel::DeepSeekV3 => "deep_seek_v3",
            ChatModel::DeepSeekR1 => "deep_seek",
            ChatModel::Hunyuan => "hunyuan_gpt_175B_0404",
            ChatModel::HunyuanT1 => "hunyuan_t1",
        }
    }

    /// ID in the OpenAI-style model catalogue.
    pub fn catalog_id(self) -> &'static str {
        match self {
            ChatModel::DeepSeekV3 => "deepseek-v3",
            ChatModel::DeepSeekR1 => "deepseek-r1",
            ChatModel::Hunyuan => "hunyuan",
            ChatModel::HunyuanT1 => "hunyuan-t1",
        }
    }

    /// Look up a model by local name or catalogue ID (case-insensitive).
    pub fn parse_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|m| {
            m.name().eq_ignore_ascii_case(name) || m.catalog_id().eq_ignore_ascii_case(name)
        })
    }

    /// Like `parse_name`, but unknown names fall back to the default model.
    pub fn from_name_or_default(name: &str) -> Self {
        Self::parse_name(name).unwrap_or_default()
    }
}

impl fmt::Display for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-message options for a chat call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatOptions {
    pub model: ChatModel,
    pub internet_search: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub model: String,
    pub prompt: String,
    pub plugin: String,
    pub display_prompt: String,
    pub display_prompt_type: u8,
    pub options: RequestOptions,
    pub multimedia: Vec<serde_json::Value>,
    pub agent_id: String,
    pub support_hint: u8,
    pub version: String,
    pub chat_model_id: String,
    pub support_functions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    pub image_intention: ImageIntention,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageIntention {
    pub need_intention_model: bool,
    pub backend_update_flag: u8,
    pub intention_status: bool,
}

impl ChatRequest {
    pub fn new(message: &str, options: ChatOptions) -> Self {
        let support_functions = if options.internet_search {
            vec![INTERNET_SEARCH_FUNCTION.to_string()]
        } else {
            Vec::new()
        };

        Self {
            model: WIRE_MODEL.to_string(),
            prompt: message.to_string(),
            plugin: PLUGIN.to_string(),
            display_prompt: message.to_string(),
            display_prompt_type: 1,
            options: RequestOptions {
                image_intention: ImageIntention {
                    need_intention_model: true,
                    backend_update_flag: 2,
                    intention_status: true,
                },
            },
            multimedia: Vec::new(),
            agent_id: AGENT_ID.to_string(),
            support_hint: 1,
            version: "v2".to_string(),
            chat_model_id: options.model.wire_id().to_string(),
            support_functions,
        }
    }
}

/// Result of a chat call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Merged thinking trace, `"null"` when the model produced none.
    pub thinking: String,
    pub answer: String,
}

/// One entry of the model catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCard {
    pub id: String,
    pub object: String,
    pub owned_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelList {
    pub data: Vec<ModelCard>,
}

impl ModelList {
    pub fn catalog() -> Self {
        let data = ChatModel::ALL
            .iter()
            .map(|m| ModelCard {
                id: m.catalog_id().to_string(),
                object: "model".to_string(),
                owned_by: "yuanbao".to_string(),
            })
            .collect();
        Self { data }
    }
}
