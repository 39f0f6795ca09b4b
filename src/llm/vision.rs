use crate::config::LlmConfig;
use crate::error::Result;
use crate::llm::chat::ChatClient;
use crate::llm::Vision;

const VISION_MAX_TOKENS: u32 = 300;

/// Vision seam backed by a multimodal chat model.
pub struct ChatVision {
    client: ChatClient,
}

impl ChatVision {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    /// Build a vision client from the environment's endpoint settings.
    pub fn from_env() -> Result<Self> {
        let client = ChatClient::new(LlmConfig::vision_from_env())?;
        log::info!("Vision model: {}", client.model());
        Ok(Self::new(client))
    }
}

impl Vision for ChatVision {
    fn analyze(&self, png: &[u8], question: &str) -> Result<String> {
        self.client
            .complete_with_image(question, png, VISION_MAX_TOKENS)
    }
}
