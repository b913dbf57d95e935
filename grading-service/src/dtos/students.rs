use serde::{de, Deserialize, Deserializer};
use std::fmt;
use validator::Validate;

use crate::models::{Marks, Student, StudentChanges};

/// Body of `POST /students`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertStudentRequest {
    #[serde(deserialize_with = "deserialize_roll_no")]
    pub roll_no: i64,
    #[validate(length(min = 1, message = "Path `studentName` is required."))]
    pub student_name: String,
    pub marks: Marks,
}

impl From<UpsertStudentRequest> for Student {
    fn from(req: UpsertStudentRequest) -> Self {
        Student::new(req.roll_no, req.student_name, req.marks)
    }
}

/// Body of `PUT /students/:rollNo`. Omitted fields are left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    pub student_name: Option<String>,
    pub marks: Option<Marks>,
}

impl From<UpdateStudentRequest> for StudentChanges {
    fn from(req: UpdateStudentRequest) -> Self {
        StudentChanges {
            student_name: req.student_name,
            marks: req.marks,
        }
    }
}

/// Accepts `7` or `"7"`; the UI posts form values as strings.
fn deserialize_roll_no<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct RollNoVisitor;

    impl<'de> de::Visitor<'de> for RollNoVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer roll number")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::custom(format!("rollNo {} is out of range", v)))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
                Ok(v as i64)
            } else {
                Err(E::custom(format!("rollNo {} is not an integer", v)))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
            v.trim().parse().map_err(|_| {
                E::custom(format!(
                    "Cast to Number failed for value \"{}\" at path \"rollNo\"",
                    v
                ))
            })
        }
    }

    deserializer.deserialize_any(RollNoVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roll_no_accepts_number_or_numeric_string() {
        let from_number: UpsertStudentRequest =
            serde_json::from_value(json!({ "rollNo": 7, "studentName": "A", "marks": {} }))
                .unwrap();
        let from_string: UpsertStudentRequest =
            serde_json::from_value(json!({ "rollNo": " 7", "studentName": "A", "marks": {} }))
                .unwrap();

        assert_eq!(from_number.roll_no, 7);
        assert_eq!(from_string.roll_no, 7);
    }

    #[test]
    fn roll_no_rejects_non_numeric_values() {
        let bad = serde_json::from_value::<UpsertStudentRequest>(
            json!({ "rollNo": "seven", "studentName": "A", "marks": {} }),
        );
        assert!(bad.is_err());

        let fractional = serde_json::from_value::<UpsertStudentRequest>(
            json!({ "rollNo": 1.5, "studentName": "A", "marks": {} }),
        );
        assert!(fractional.is_err());
    }

    #[test]
    fn empty_student_name_fails_validation() {
        let req: UpsertStudentRequest =
            serde_json::from_value(json!({ "rollNo": 1, "studentName": "", "marks": {} }))
                .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_request_fields_are_optional() {
        let req: UpdateStudentRequest =
            serde_json::from_value(json!({ "marks": { "Math": 88 } })).unwrap();
        let changes = StudentChanges::from(req);

        assert!(changes.student_name.is_none());
        assert_eq!(changes.marks.unwrap()["Math"], 88.0);
    }
}
