use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::sanitize::{clean, clean_opt};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl ClassInput {
    pub fn new(name: &str, description: &str) -> Self {
        Self { name: name.to_string(), description: Some(description.to_string()) }
    }

    pub fn normalize_and_validate(self) -> Result<Self, ModelError> {
        let name = clean(&self.name);
        if name.is_empty() {
            return Err(ModelError::validation("class name is required"));
        }
        Ok(Self { name, description: clean_opt(self.description) })
    }

    pub fn into_class(self, id: u64) -> Class {
        Class { id, name: self.name, description: self.description }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_requires_name() {
        let ok = ClassInput { name: "  Class 9-C ".into(), description: Some(" ".into()) }
            .normalize_and_validate()
            .unwrap();
        assert_eq!(ok.name, "Class 9-C");
        assert_eq!(ok.description, None);

        let blank = ClassInput { name: "<script>x</script>".into(), description: None };
        assert!(blank.normalize_and_validate().is_err());
    }
}
