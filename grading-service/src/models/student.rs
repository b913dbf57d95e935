use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Subject name to score. Open-ended: any subject key is accepted.
pub type Marks = BTreeMap<String, f64>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub roll_no: i64,
    pub student_name: String,
    pub marks: Marks,
}

impl Student {
    pub fn new(roll_no: i64, student_name: impl Into<String>, marks: Marks) -> Self {
        Self {
            roll_no,
            student_name: student_name.into(),
            marks,
        }
    }
}

/// Fields to overwrite on an existing student. `None` leaves the field as stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentChanges {
    pub student_name: Option<String>,
    pub marks: Option<Marks>,
}

impl StudentChanges {
    pub fn is_empty(&self) -> bool {
        self.student_name.is_none() && self.marks.is_none()
    }

    pub fn apply(self, student: &mut Student) {
        if let Some(name) = self.student_name {
            student.student_name = name;
        }
        if let Some(marks) = self.marks {
            student.marks = marks;
        }
    }
}
