use std::{env, net::{SocketAddr, ToSocketAddrs as _}};

use sea_orm::ConnectOptions;
use tracing::info;

use crate::consts::DEFAULT_LATE_SHIFT_DEPARTMENT;

pub struct Config {
    pub host_address: SocketAddr,

    pub database_opt: ConnectOptions,

    pub jwt_key: String,

    /// Department label whose pay week starts on Wednesday
    pub late_shift_department: String,
}

/// Payroll rules shared with request handlers through `web::Data`
#[derive(Debug, Clone)]
pub struct PayrollSettings {
    pub late_shift_department: String,
}

impl Default for PayrollSettings {
    fn default() -> Self {
        Self {
            late_shift_department: DEFAULT_LATE_SHIFT_DEPARTMENT.to_string(),
        }
    }
}

pub fn load() -> Config {
    Config {
        host_address: load_host_address(),
        database_opt: load_database_opt().into(),
        jwt_key: load_jwt_key(),
        late_shift_department: load_late_shift_department(),
    }
}

fn load_host_address() -> SocketAddr {
    info!("Loading environment `HOST_ADDRESS`");

    let var = env::var("HOST_ADDRESS").unwrap_or_else(|_| "127.0.0.1:0".to_string());

    var.to_socket_addrs()
        .expect("`HOST_ADDRESS` is not in a valid format").nth(0)
        .expect("unable to resolve host from `HOST_ADDRESS`")
}

fn load_database_opt() -> impl Into<ConnectOptions> {
    info!("Loading environment `DATABASE_URL`");

    env::var("DATABASE_URL").expect("Environment `DATABASE_URL` is required to be set")
}

fn load_jwt_key() -> String {
    info!("Loading environment `JWT_SECRET`");

    env::var("JWT_SECRET").expect("Environment `JWT_SECRET` is required to be set")
}

fn load_late_shift_department() -> String {
    info!("Loading environment `LATE_SHIFT_DEPARTMENT`");

    env::var("LATE_SHIFT_DEPARTMENT")
        .ok()
        .map(|var| var.trim().to_string())
        .filter(|var| !var.is_empty())
        .unwrap_or_else(|| DEFAULT_LATE_SHIFT_DEPARTMENT.to_string())
}
