use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::sanitize::{clean, clean_opt};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: u64,
    /// School-issued code such as `ST-1001`; unique across students.
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub class_name: String,
    pub phone_number: Option<String>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub address: Option<String>,
    pub active: bool,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Create/update payload. `id` is assigned by the store.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudentInput {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub class_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub parent_name: Option<String>,
    #[serde(default)]
    pub parent_phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl StudentInput {
    pub fn normalize_and_validate(self) -> Result<Self, ModelError> {
        let input = Self {
            student_id: clean(&self.student_id),
            first_name: clean(&self.first_name),
            last_name: clean(&self.last_name),
            email: clean_opt(self.email),
            class_name: clean(&self.class_name),
            phone_number: clean_opt(self.phone_number),
            parent_name: clean_opt(self.parent_name),
            parent_phone: clean_opt(self.parent_phone),
            address: clean_opt(self.address),
            active: self.active,
        };
        if input.first_name.chars().count() < 2 {
            return Err(ModelError::validation("first name must be at least 2 characters"));
        }
        if input.last_name.chars().count() < 2 {
            return Err(ModelError::validation("last name must be at least 2 characters"));
        }
        if input.student_id.chars().count() < 3 {
            return Err(ModelError::validation("student ID must be at least 3 characters"));
        }
        if let Some(email) = &input.email {
            validate_email(email)?;
        }
        if input.class_name.is_empty() {
            return Err(ModelError::validation("class must be selected"));
        }
        Ok(input)
    }

    pub fn into_student(self, id: u64) -> Student {
        Student {
            id,
            student_id: self.student_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            class_name: self.class_name,
            phone_number: self.phone_number,
            parent_name: self.parent_name,
            parent_phone: self.parent_phone,
            address: self.address,
            active: self.active.unwrap_or(true),
        }
    }

    /// Overwrite the editable fields of `student`. `active` is only touched
    /// when the payload carries it.
    pub fn apply_to(self, student: &mut Student) {
        let active = self.active.unwrap_or(student.active);
        *student = Self { active: Some(active), ..self }.into_student(student.id);
    }
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'));
    if !valid {
        return Err(ModelError::validation("please enter a valid email address"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> StudentInput {
        StudentInput {
            student_id: " ST-1001 ".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: Some("".into()),
            class_name: "Class 10-A".into(),
            phone_number: None,
            parent_name: Some("<script>alert(1)</script>  ".into()),
            parent_phone: None,
            address: None,
            active: None,
        }
    }

    #[test]
    fn normalizes_strings_and_defaults_active() {
        let s = input().normalize_and_validate().unwrap().into_student(7);
        assert_eq!(s.id, 7);
        assert_eq!(s.student_id, "ST-1001");
        assert_eq!(s.email, None);
        assert_eq!(s.parent_name, None);
        assert!(s.active);
        assert_eq!(s.full_name(), "Ada Lovelace");
    }

    #[test]
    fn rejects_short_names_and_bad_email() {
        let short = StudentInput { first_name: "A".into(), ..input() };
        assert!(short.normalize_and_validate().is_err());

        let code = StudentInput { student_id: "S1".into(), ..input() };
        assert!(code.normalize_and_validate().is_err());

        let email = StudentInput { email: Some("not-an-email".into()), ..input() };
        assert!(email.normalize_and_validate().is_err());

        let class = StudentInput { class_name: "  ".into(), ..input() };
        assert!(class.normalize_and_validate().is_err());
    }

    #[test]
    fn form_rules_use_minimum_lengths_and_a_dotted_domain() {
        let one_letter = StudentInput { first_name: " J ".into(), ..input() };
        assert_eq!(
            one_letter.normalize_and_validate().unwrap_err(),
            ModelError::validation("first name must be at least 2 characters")
        );
        let two_letters = StudentInput { first_name: "Jo".into(), last_name: "Li".into(), ..input() };
        assert!(two_letters.normalize_and_validate().is_ok());

        assert!(validate_email("ops@localhost").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ops@.com").is_err());
        assert!(validate_email("ops@example.com").is_ok());

        let code = StudentInput { student_id: "S-1".into(), ..input() };
        assert!(code.normalize_and_validate().is_ok());
    }

    #[test]
    fn apply_keeps_active_unless_given() {
        let mut s = input().normalize_and_validate().unwrap().into_student(1);
        s.active = false;
        let upd = StudentInput { first_name: "Augusta".into(), ..input() }
            .normalize_and_validate()
            .unwrap();
        upd.apply_to(&mut s);
        assert_eq!(s.first_name, "Augusta");
        assert!(!s.active);
        assert_eq!(s.id, 1);
    }

    #[test]
    fn deserializes_camel_case_payload() {
        let raw = r#"{"studentId":"ST-2","firstName":"Bo","lastName":"Li","className":"Class 11-B"}"#;
        let parsed: StudentInput = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.class_name, "Class 11-B");
        assert_eq!(parsed.email, None);
    }
}
