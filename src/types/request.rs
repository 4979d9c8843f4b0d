//! Routed request envelope

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Caller-assigned urgency. Carried through for logging; it does not
/// reorder work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// A request addressed by category and action, with free-form parameters.
///
/// Parameters are validated into a typed [`Operation`](crate::Operation)
/// at dispatch time.
///
/// ```rust
/// # use waypost::RoutedRequest;
/// let request = RoutedRequest::new("research", "get_wikipedia").param("title", "Entropy");
/// assert_eq!(request.parameters["title"], "Entropy");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutedRequest {
    pub category: String,
    pub action: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl RoutedRequest {
    pub fn new(category: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            action: action.into(),
            parameters: Map::new(),
            context: None,
            priority: None,
        }
    }

    /// Add (or overwrite) a single parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Replace the whole parameter map.
    pub fn parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn context(mut self, context: Map<String, Value>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}
