use actix_web::{get, post, web, Responder};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{auth::{load_roles, AuthContext, Authority}, entity::{prelude::*, profile}, error::PayrollError};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(login)
        .service(whoami);
}

#[derive(Debug, Serialize, Deserialize)]
struct Login {
    username: String,
    password: String,
}

#[post("/login")]
async fn login(db: web::Data<DatabaseConnection>, authority: web::Data<Authority>, credentials: web::Json<Login>) -> Result<impl Responder, actix_web::Error> {
    let hashed_password = &Sha256::digest(format!("{}:{}", credentials.password, credentials.username))[..];

    let Some(profile) = Profile::find()
        .filter(profile::Column::Username.eq(&credentials.username))
        .filter(profile::Column::Password.eq(hashed_password))
        .filter(profile::Column::Active.eq(true))
        .one(db.get_ref()).await
        .map_err(PayrollError::from)?
    else {
        tracing::info!(username = %credentials.username, "Rejected login");
        return Err(actix_web::error::ErrorForbidden("invalid credentials"));
    };

    let roles = load_roles(db.get_ref(), profile.id).await.map_err(PayrollError::from)?;

    Ok(
        authority.issue_for(&AuthContext::new(profile, roles))?
    )
}

#[get("")]
async fn whoami(context: AuthContext) -> impl Responder {
    web::Json(context)
}
