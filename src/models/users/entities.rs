use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 用户角色（由身份服务签发在令牌中）
#[derive(Debug, Clone, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub enum UserRole {
    Student,       // 学生
    Faculty,       // 教师
    Administrator, // 管理员
}

impl UserRole {
    pub const STUDENT: &'static str = "student";
    pub const FACULTY: &'static str = "faculty";
    pub const ADMINISTRATOR: &'static str = "administrator";

    pub fn faculty_roles() -> &'static [&'static UserRole] {
        &[&Self::Faculty, &Self::Administrator]
    }
    pub fn student_roles() -> &'static [&'static UserRole] {
        &[&Self::Student]
    }

    /// 是否可以评审和定稿
    pub fn is_evaluator(&self) -> bool {
        matches!(self, UserRole::Faculty | UserRole::Administrator)
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户角色: '{s}'. 支持的角色: student, faculty, administrator"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Student => write!(f, "{}", UserRole::STUDENT),
            UserRole::Faculty => write!(f, "{}", UserRole::FACULTY),
            UserRole::Administrator => write!(f, "{}", UserRole::ADMINISTRATOR),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            UserRole::STUDENT => Ok(UserRole::Student),
            UserRole::FACULTY => Ok(UserRole::Faculty),
            UserRole::ADMINISTRATOR => Ok(UserRole::Administrator),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

/// 已验证的调用方身份
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct Identity {
    pub username: String,
    pub role: UserRole,
    pub email: Option<String>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Administrator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_roundtrip() {
        for role in [UserRole::Student, UserRole::Faculty, UserRole::Administrator] {
            assert_eq!(role.to_string().parse::<UserRole>(), Ok(role));
        }
        assert!("teacher".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_deserialize_rejects_unknown() {
        let role: UserRole = serde_json::from_str("\"faculty\"").unwrap();
        assert_eq!(role, UserRole::Faculty);
        assert!(serde_json::from_str::<UserRole>("\"root\"").is_err());
    }

    #[test]
    fn test_evaluator_roles() {
        assert!(!UserRole::Student.is_evaluator());
        assert!(UserRole::Faculty.is_evaluator());
        assert!(UserRole::Administrator.is_evaluator());
    }
}
