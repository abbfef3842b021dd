use std::ops::Deref;

use actix_web::{body, dev, http::{self, header::ContentType, StatusCode}, web, FromRequest, HttpRequest, HttpResponse};
use chrono::{Duration, Local};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{entity::{prelude::*, profile, sea_orm_active_enums::RoleType, user_role}, error::PayrollError};

/// Issues and verifies HS256 session tokens
pub struct Authority {
    jwt_key: (EncodingKey, DecodingKey),
}

impl Authority {
    pub fn new(jwt_key: &[u8]) -> Self {
        Self {
            jwt_key: (EncodingKey::from_secret(jwt_key), DecodingKey::from_secret(jwt_key))
        }
    }

    /// Issue a token for the caller with 1 week of expiration time
    pub fn issue_for(&self, context: &AuthContext) -> Result<String, AuthError> {
        let claims = Claims {
            exp: (Local::now() + Duration::weeks(1)).timestamp(),
            data: context
        };

        Ok(encode(&Header::default(), &claims, &self.jwt_key.0)?)
    }

    pub fn authorize(&self, token: impl AsRef<str>) -> Result<AuthContext, AuthError> {
        let payload = decode::<Claims<AuthContext>>(token.as_ref(), &self.jwt_key.1, &Validation::default())?;

        Ok(payload.claims.data)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims<T> {
    exp: i64,
    data: T,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authority error")]
    AuthorityError(#[from] jsonwebtoken::errors::Error),
}

impl actix_web::error::ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse<body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }

    fn status_code(&self) -> http::StatusCode {
        match self {
            AuthError::AuthorityError(_) => StatusCode::FORBIDDEN,
        }
    }
}

/// Who is calling, passed explicitly into every permission check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub profile: profile::Model,
    /// Roles granted on top of the profile's primary role
    pub roles: Vec<RoleType>,
}

impl AuthContext {
    pub fn new(profile: profile::Model, roles: Vec<RoleType>) -> Self {
        Self { profile, roles }
    }

    pub fn id(&self) -> Uuid {
        self.profile.id
    }

    pub fn has_role(&self, role: RoleType) -> bool {
        self.profile.role == role || self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(RoleType::Admin)
    }

    pub fn has_payroll_access(&self) -> bool {
        !self.has_role(RoleType::Creator)
    }

    /// Confirms or rejects locked weeks
    pub fn can_approve_payroll(&self) -> bool {
        self.has_role(RoleType::HrWorkForce)
    }

    /// Sees every chatter's payroll
    pub fn can_manage_all(&self) -> bool {
        self.has_payroll_access()
            && [RoleType::Admin, RoleType::Va, RoleType::HrWorkForce].into_iter().any(|role| self.has_role(role))
    }

    /// Edits sales and attendance and locks the week
    pub fn can_edit(&self, chatter_id: Uuid) -> bool {
        self.has_payroll_access() && (self.is_admin() || self.id() == chatter_id)
    }

    pub fn can_view(&self, chatter_id: Uuid) -> bool {
        self.can_edit(chatter_id) || self.can_manage_all()
    }
}

/// Additional roles currently granted to a profile
pub async fn load_roles(db: &DatabaseConnection, profile_id: Uuid) -> Result<Vec<RoleType>, DbErr> {
    Ok(
        UserRole::find()
            .filter(user_role::Column::ProfileId.eq(profile_id))
            .all(db).await?
            .into_iter()
            .map(|role| role.role)
            .collect()
    )
}

impl FromRequest for AuthContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // Grabs the value after the space in `Authorization: JWT <token>`
            let Some(Ok(Some((_, token)))) = req.headers()
                .get("Authorization")
                .map(|v|
                    v.to_str()
                        .map(|str| str.split_once(" "))
                )
            else {
                return Err(actix_web::error::ErrorUnauthorized("unauthorized"))
            };

            let authority = req.app_data::<web::Data<Authority>>().expect("Authority must be attached");
            let claimed = authority.authorize(token)?;

            // The token only proves identity, account state is read fresh
            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");

            let Some(mut profile) = Profile::find_by_id(claimed.id())
                .one(db.get_ref()).await
                .map_err(PayrollError::from)?
            else {
                return Err(actix_web::error::ErrorForbidden("account no longer exists"))
            };

            if !profile.active {
                tracing::info!(profile_id = %profile.id, "Rejected deactivated account");
                return Err(actix_web::error::ErrorForbidden("account is deactivated"))
            }

            let roles = load_roles(db.get_ref(), profile.id).await.map_err(PayrollError::from)?;
            profile.password = Vec::new();

            Ok(AuthContext::new(profile, roles))
        })
    }
}

pub struct Admin(pub AuthContext);

impl Deref for Admin {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for Admin {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let context = AuthContext::from_request(&req, &mut dev::Payload::None).await?;

            if !context.is_admin() {
                return Err(actix_web::error::ErrorForbidden("forbidden"))
            }

            Ok(Self(context))
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Local;
    use rust_decimal::Decimal;
    use sea_orm::MockDatabase;
    use uuid::Uuid;

    use crate::entity::{profile, sea_orm_active_enums::RoleType, user_role};

    use super::AuthContext;

    pub(crate) fn profile(role: RoleType, department: Option<&str>) -> profile::Model {
        profile::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            username: "bob".to_string(),
            password: Vec::new(),
            name: "Bob".to_string(),
            role,
            department: department.map(str::to_string),
            hourly_rate: Decimal::from(15),
            active: true,
        }
    }

    pub(crate) fn context(role: RoleType) -> AuthContext {
        AuthContext::new(profile(role, None), Vec::new())
    }

    pub(crate) fn user_role(profile_id: Uuid, role: RoleType) -> user_role::Model {
        user_role::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            profile_id,
            role,
        }
    }

    /// Queues the profile and role rows the `AuthContext` extractor reads
    pub(crate) trait MockSession {
        fn with_session(self, context: &AuthContext) -> Self;
    }

    impl MockSession for MockDatabase {
        fn with_session(self, context: &AuthContext) -> Self {
            let roles: Vec<user_role::Model> = context.roles.iter()
                .map(|role| user_role(context.id(), *role))
                .collect();

            self
                .append_query_results([
                    vec![ context.profile.clone() ],
                ])
                .append_query_results([
                    roles,
                ])
        }
    }
}
