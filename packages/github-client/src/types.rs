use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of account owning a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerKind {
    User,
    Organization,
    /// Any other account type GitHub may report (e.g. `Bot`).
    #[serde(other)]
    Other,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::User => "User",
            OwnerKind::Organization => "Organization",
            OwnerKind::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "User" => OwnerKind::User,
            "Organization" => OwnerKind::Organization,
            _ => OwnerKind::Other,
        }
    }
}

/// Owner block embedded in a repository response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
    #[serde(rename = "type")]
    pub kind: OwnerKind,
}

/// `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub full_name: String,
    pub stargazers_count: i64,
    pub owner: RepositoryOwner,
}

/// `GET /repos/{owner}/{repo}/contributors`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub login: String,
}

/// Minimal account reference used inside stargazer events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
}

/// One entry of `GET /repos/{owner}/{repo}/stargazers` when requested with
/// the `application/vnd.github.v3.star+json` media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stargazer {
    pub user: Account,
    pub starred_at: DateTime<Utc>,
}

/// `GET /users/{login}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
}

/// One entry of `GET /users/{login}/orgs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub login: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_deserializes_owner_type() {
        let json = r#"{
            "id": 1,
            "full_name": "octo-org/hello",
            "stargazers_count": 5012,
            "owner": {"login": "octo-org", "type": "Organization", "id": 9}
        }"#;
        let repo: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.full_name, "octo-org/hello");
        assert_eq!(repo.stargazers_count, 5012);
        assert_eq!(repo.owner.kind, OwnerKind::Organization);
    }

    #[test]
    fn test_unknown_owner_type_maps_to_other() {
        let json = r#"{"login": "dependabot", "type": "Bot"}"#;
        let owner: RepositoryOwner = serde_json::from_str(json).unwrap();
        assert_eq!(owner.kind, OwnerKind::Other);
    }

    #[test]
    fn test_missing_stargazers_count_is_rejected() {
        let json = r#"{"full_name": "a/b", "owner": {"login": "a", "type": "User"}}"#;
        assert!(serde_json::from_str::<Repository>(json).is_err());
    }

    #[test]
    fn test_stargazer_event_parses_timestamp() {
        let json = r#"[{"starred_at": "2020-04-12T08:15:00Z", "user": {"login": "Foo", "id": 3}}]"#;
        let events: Vec<Stargazer> = serde_json::from_str(json).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].user.login, "Foo");
        assert_eq!(events[0].starred_at.to_rfc3339(), "2020-04-12T08:15:00+00:00");
    }

    #[test]
    fn test_owner_kind_roundtrips_through_str() {
        for kind in [OwnerKind::User, OwnerKind::Organization, OwnerKind::Other] {
            assert_eq!(OwnerKind::parse(kind.as_str()), kind);
        }
    }
}
