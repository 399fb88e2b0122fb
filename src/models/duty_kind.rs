use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DutyKind {
    Facilitator,
    Checker,
}

impl DutyKind {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            DutyKind::Facilitator => "facilitator",
            DutyKind::Checker => "checker",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "facilitator" => Some(DutyKind::Facilitator),
            "checker" => Some(DutyKind::Checker),
            _ => None,
        }
    }

    /// Accepts the short CLI codes as well as the labels used on the duty form.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "f" | "facilitator" | "student facilitator" => Some(DutyKind::Facilitator),
            "c" | "checker" | "attendance checker" => Some(DutyKind::Checker),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DutyKind::Facilitator => "Facilitator",
            DutyKind::Checker => "Checker",
        }
    }
}
