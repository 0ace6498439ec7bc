//! Named text block model

use serde::{Deserialize, Serialize};

/// Generic named text storage, e.g. the `about` page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub id: i64,
    pub name: String,
    pub text: String,
}
