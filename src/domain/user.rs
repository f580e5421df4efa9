use uuid::Uuid;

/// A visitor whose identity stays fixed for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedUser {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub user_agent: String,
    pub locale: String,
}

impl SimulatedUser {
    pub fn new(
        user_id: Uuid,
        session_id: Uuid,
        user_agent: impl Into<String>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            session_id,
            user_agent: user_agent.into(),
            locale: locale.into(),
        }
    }

    /// First eight hex digits of the user id, used in log lines
    pub fn short_id(&self) -> String {
        let mut id = self.user_id.simple().to_string();
        id.truncate(8);
        id
    }
}
