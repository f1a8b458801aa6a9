use indexmap::IndexMap;

pub const IMAGE_EDIT: &str = "image_edit";
pub const VIDEO: &str = "video";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: String,
    pub provider: String,
    pub capabilities: Vec<String>,
    /// Resolution tiers the model renders; empty for image models.
    pub resolutions: Vec<String>,
}

impl ModelSpec {
    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|item| item == capability)
    }

    pub fn renders(&self, resolution: &str) -> bool {
        self.resolutions.iter().any(|tier| tier == resolution)
    }
}

#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelSpec>,
}

impl ModelRegistry {
    pub fn new(models: Option<IndexMap<String, ModelSpec>>) -> Self {
        Self {
            models: models.unwrap_or_else(default_models),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.models.get(name)
    }

    pub fn list(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.values()
    }

    pub fn by_capability(&self, capability: &str) -> Vec<ModelSpec> {
        self.models
            .values()
            .filter(|model| model.supports(capability))
            .cloned()
            .collect()
    }

    pub fn ensure(&self, name: &str, capability: &str) -> Option<ModelSpec> {
        let model = self.get(name)?;
        if model.supports(capability) {
            return Some(model.clone());
        }
        None
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

fn default_models() -> IndexMap<String, ModelSpec> {
    let mut map = IndexMap::new();

    let mut insert = |name: &str, capabilities: &[&str], resolutions: &[&str]| {
        map.insert(
            name.to_string(),
            ModelSpec {
                name: name.to_string(),
                provider: "gemini".to_string(),
                capabilities: capabilities
                    .iter()
                    .map(|item| (*item).to_string())
                    .collect(),
                resolutions: resolutions
                    .iter()
                    .map(|item| (*item).to_string())
                    .collect(),
            },
        );
    };

    // Order matters: the first model per capability is the default.
    insert("gemini-2.5-flash-image", &[IMAGE_EDIT], &[]);
    insert("gemini-3-pro-image-preview", &[IMAGE_EDIT], &[]);
    insert("veo-3.1-fast-generate-preview", &[VIDEO], &["720p", "1080p"]);
    insert("veo-3.1-generate-preview", &[VIDEO], &["720p", "1080p"]);

    map
}
