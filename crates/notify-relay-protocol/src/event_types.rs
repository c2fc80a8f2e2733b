//! Well-known event type tags.
//!
//! The relay forwards any non-empty `type`, so these are conventions shared
//! by producers and consumers rather than a closed set. Tags keep the
//! spelling existing dashboards already match on.

// Users
pub const USER_REGISTERED: &str = "usuario_registrado";
pub const USER_LOGGED_IN: &str = "usuario_inicio_sesion";

// Bookings
pub const BOOKING_CREATED: &str = "reserva_creada";
pub const BOOKING_UPDATED: &str = "reserva_actualizada";
pub const BOOKING_CANCELLED: &str = "reserva_cancelada";

pub const SERVICE_HIRED: &str = "servicio_contratado";
pub const RECOMMENDATION_CREATED: &str = "recomendacion_creada";

// Catalogue administration
pub const TOUR_CREATED: &str = "tour_creado";
pub const TOUR_UPDATED: &str = "tour_actualizado";
pub const TOUR_DELETED: &str = "tour_eliminado";

pub const SERVICE_CREATED: &str = "servicio_creado";
pub const SERVICE_UPDATED: &str = "servicio_actualizado";
pub const SERVICE_DELETED: &str = "servicio_eliminado";

pub const DESTINATION_CREATED: &str = "destino_creado";
pub const DESTINATION_UPDATED: &str = "destino_actualizado";
pub const DESTINATION_DELETED: &str = "destino_eliminado";

pub const GUIDE_CREATED: &str = "guia_creado";
pub const GUIDE_UPDATED: &str = "guia_actualizado";
pub const GUIDE_DELETED: &str = "guia_eliminado";

// System
pub const SYSTEM_UPDATED: &str = "sistema_actualizado";
pub const ERROR: &str = "error";

/// Alerts for the admin panel, see [`crate::Notification::admin_alert`].
pub const ADMIN_ALERT: &str = "admin_alert";

/// Tags emitted by the services and contracting backend.
pub mod contracting {
    pub const SERVICE_CREATED: &str = "servicio_created";
    pub const SERVICE_UPDATED: &str = "servicio_updated";
    pub const SERVICE_DELETED: &str = "servicio_deleted";

    pub const CONTRACT_CREATED: &str = "contratacion_created";
    pub const CONTRACT_UPDATED: &str = "contratacion_updated";
    pub const CONTRACT_CANCELLED: &str = "contratacion_cancelled";

    pub const PAYMENT_PROCESSED: &str = "payment_processed";
    pub const PAYMENT_FAILED: &str = "payment_failed";

    pub const BOOKING_CONFIRMED: &str = "booking_confirmed";
    pub const BOOKING_CANCELLED: &str = "booking_cancelled";

    pub const ALL: &[&str] = &[
        SERVICE_CREATED,
        SERVICE_UPDATED,
        SERVICE_DELETED,
        CONTRACT_CREATED,
        CONTRACT_UPDATED,
        CONTRACT_CANCELLED,
        PAYMENT_PROCESSED,
        PAYMENT_FAILED,
        BOOKING_CONFIRMED,
        BOOKING_CANCELLED,
    ];
}

/// Every tag declared at the top of this module.
pub const ALL: &[&str] = &[
    USER_REGISTERED,
    USER_LOGGED_IN,
    BOOKING_CREATED,
    BOOKING_UPDATED,
    BOOKING_CANCELLED,
    SERVICE_HIRED,
    RECOMMENDATION_CREATED,
    TOUR_CREATED,
    TOUR_UPDATED,
    TOUR_DELETED,
    SERVICE_CREATED,
    SERVICE_UPDATED,
    SERVICE_DELETED,
    DESTINATION_CREATED,
    DESTINATION_UPDATED,
    DESTINATION_DELETED,
    GUIDE_CREATED,
    GUIDE_UPDATED,
    GUIDE_DELETED,
    SYSTEM_UPDATED,
    ERROR,
    ADMIN_ALERT,
];

/// Whether `tag` is one of the well-known tags.
pub fn is_known(tag: &str) -> bool {
    ALL.contains(&tag) || contracting::ALL.contains(&tag)
}
