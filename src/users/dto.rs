use serde::Deserialize;

/// Request body for account creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_adm: bool,
}

/// Partial profile edit. Absent fields are left untouched; anything else in
/// the body (`uuid`, `isAdm`, timestamps) is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}
