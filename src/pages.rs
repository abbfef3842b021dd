use actix_web::web;

mod auth;
mod attendance;
mod payroll;
mod profiles;
mod sales;
mod week;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(web::scope("/auth")
            .configure(auth::config))
        .service(web::scope("/profiles")
            .configure(profiles::config))
        .service(web::scope("/sales")
            .configure(sales::config))
        .service(web::scope("/attendance")
            .configure(attendance::config))
        .service(web::scope("/payroll")
            .configure(payroll::config));
}
