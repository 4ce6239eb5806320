/// 세션(사용자 식별 정보)
/// 신원이 필요한 연산은 Session 값을 명시적으로 전달받는다.
/// SessionStore 는 userEmail / userName / userRole 스칼라 키에 로그인 상태를 보관한다.
// region:    --- Imports
use crate::error::MarketError;
use crate::storage::{keys, SharedStore, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

// endregion: --- Imports

// region:    --- Role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Consumer,
    Seller,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Consumer => "consumer",
            Role::Seller => "seller",
        }
    }

    /// 이름이 비어 있을 때 쓰는 기본 표시 이름
    pub fn default_name(&self) -> &'static str {
        match self {
            Role::Consumer => "Consumer",
            Role::Seller => "Seller",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "consumer" => Ok(Role::Consumer),
            "seller" => Ok(Role::Seller),
            other => Err(MarketError::InvalidField(format!("role={}", other))),
        }
    }
}

// endregion: --- Role

// region:    --- Session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub role: Role,
}

impl Session {
    pub fn new(email: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            role,
        }
    }

    /// 표시 이름 (비어 있으면 역할 기본값)
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.role.default_name()
        } else {
            &self.name
        }
    }

    /// 역할 확인
    pub fn require(&self, role: Role) -> Result<(), MarketError> {
        if self.role == role {
            Ok(())
        } else {
            Err(MarketError::Forbidden(role))
        }
    }

    /// 필수 항목 확인
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.email.trim().is_empty() {
            return Err(MarketError::MissingField("email"));
        }
        Ok(())
    }
}

// endregion: --- Session

// region:    --- Session Store
#[derive(Clone)]
pub struct SessionStore {
    store: SharedStore,
}

impl SessionStore {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// 로그인 (세션 키 기록)
    pub async fn login(&self, session: &Session) -> Result<(), MarketError> {
        session.validate()?;
        info!(
            "{:<12} --> 로그인: {} ({})",
            "Session", session.email, session.role
        );
        self.store
            .set(keys::USER_EMAIL, session.email.clone())
            .await?;
        self.store
            .set(keys::USER_NAME, session.display_name().to_string())
            .await?;
        self.store
            .set(keys::USER_ROLE, session.role.as_str().to_string())
            .await?;
        Ok(())
    }

    /// 현재 세션 조회
    /// 이메일이 없으면 로그아웃 상태, 역할을 해석할 수 없으면 세션 없음으로 본다.
    pub async fn current(&self) -> Result<Option<Session>, StoreError> {
        let Some(email) = self.store.get(keys::USER_EMAIL).await? else {
            return Ok(None);
        };
        let Some(role) = self
            .store
            .get(keys::USER_ROLE)
            .await?
            .and_then(|r| r.parse::<Role>().ok())
        else {
            return Ok(None);
        };
        let name = self.store.get(keys::USER_NAME).await?.unwrap_or_default();
        Ok(Some(Session { email, name, role }))
    }

    /// 로그아웃 (세션 키 삭제)
    pub async fn logout(&self) -> Result<(), StoreError> {
        info!("{:<12} --> 로그아웃", "Session");
        self.store.remove(keys::USER_EMAIL).await?;
        self.store.remove(keys::USER_ROLE).await?;
        self.store.remove(keys::USER_NAME).await?;
        Ok(())
    }
}

// endregion: --- Session Store

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_login_current_logout() {
        let sessions = SessionStore::new(Arc::new(InMemoryStore::new()));
        assert!(sessions.current().await.unwrap().is_none());

        let session = Session::new("seller@test.com", "", Role::Seller);
        sessions.login(&session).await.unwrap();

        let current = sessions.current().await.unwrap().unwrap();
        assert_eq!(current.email, "seller@test.com");
        assert_eq!(current.name, "Seller");
        assert_eq!(current.role, Role::Seller);

        sessions.logout().await.unwrap();
        assert!(sessions.current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_requires_email() {
        let sessions = SessionStore::new(Arc::new(InMemoryStore::new()));
        let err = sessions
            .login(&Session::new(" ", "Kim", Role::Consumer))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::MissingField("email")));
    }

    #[test]
    fn test_require_role() {
        let consumer = Session::new("c@test.com", "Lee", Role::Consumer);
        assert!(consumer.require(Role::Consumer).is_ok());
        assert!(matches!(
            consumer.require(Role::Seller),
            Err(MarketError::Forbidden(Role::Seller))
        ));
        assert!("admin".parse::<Role>().is_err());
    }
}
// endregion: --- Tests
