use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

use super::event::{create_event, delete_event, get_event, list_events, update_event};
use super::health::health;
use super::notification::send_notification;
use super::template::{
    create_email_template, create_sms_template, delete_email_template, delete_sms_template,
    get_email_template, get_sms_template, list_email_templates, list_sms_templates,
    update_email_template, update_sms_template,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest(
            "/communications",
            Router::new()
                // Trigger
                .route("/notification", post(send_notification))
                // Email template CRUD
                .route("/email", post(create_email_template).get(list_email_templates))
                .route(
                    "/email/{id}",
                    get(get_email_template)
                        .put(update_email_template)
                        .delete(delete_email_template),
                )
                // SMS template CRUD
                .route("/sms", post(create_sms_template).get(list_sms_templates))
                .route(
                    "/sms/{id}",
                    get(get_sms_template)
                        .put(update_sms_template)
                        .delete(delete_sms_template),
                )
                // Event catalog CRUD
                .route("/event", post(create_event).get(list_events))
                .route(
                    "/event/{id}",
                    get(get_event).put(update_event).delete(delete_event),
                ),
        )
}
