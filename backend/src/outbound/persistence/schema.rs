//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate them with `diesel print-schema`
//! or update them by hand.

diesel::table! {
    /// Accounts of beneficiaries, professionals and administrators.
    users (id) {
        id -> Uuid,
        /// Normalised (trimmed, lower-cased) address.
        email -> Varchar,
        password_hash -> Text,
        public_name -> Varchar,
        departement_code -> Varchar,
        can_book_free_offers -> Bool,
        is_admin -> Bool,
        validation_token -> Nullable<Varchar>,
        reset_password_token -> Nullable<Varchar>,
        reset_password_token_validity_limit -> Nullable<Timestamptz>,
        date_created -> Timestamptz,
    }
}

diesel::table! {
    offerers (id) {
        id -> Uuid,
        name -> Varchar,
        siren -> Varchar,
        address -> Nullable<Varchar>,
        postal_code -> Varchar,
        city -> Varchar,
        is_active -> Bool,
        validation_token -> Nullable<Varchar>,
        bic -> Nullable<Varchar>,
        iban -> Nullable<Varchar>,
        date_created -> Timestamptz,
    }
}

diesel::table! {
    /// Rights a user holds on an offerer.
    user_offerers (id) {
        id -> Uuid,
        user_id -> Uuid,
        offerer_id -> Uuid,
        rights -> Varchar,
        validation_token -> Nullable<Varchar>,
    }
}

diesel::table! {
    venues (id) {
        id -> Uuid,
        managing_offerer_id -> Uuid,
        name -> Varchar,
        public_name -> Nullable<Varchar>,
        siret -> Nullable<Varchar>,
        comment -> Nullable<Text>,
        address -> Nullable<Varchar>,
        postal_code -> Nullable<Varchar>,
        city -> Nullable<Varchar>,
        departement_code -> Nullable<Varchar>,
        booking_email -> Nullable<Varchar>,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        is_virtual -> Bool,
        validation_token -> Nullable<Varchar>,
    }
}

diesel::table! {
    offers (id) {
        id -> Uuid,
        venue_id -> Uuid,
        name -> Varchar,
        description -> Nullable<Text>,
        /// `EventType.*` or `ThingType.*` code.
        product_type -> Varchar,
        url -> Nullable<Varchar>,
        is_active -> Bool,
        duration_minutes -> Nullable<Int4>,
        date_created -> Timestamptz,
    }
}

diesel::table! {
    stocks (id) {
        id -> Uuid,
        offer_id -> Uuid,
        price -> Numeric,
        /// Null means unlimited.
        available -> Nullable<Int8>,
        beginning_datetime -> Nullable<Timestamptz>,
        end_datetime -> Nullable<Timestamptz>,
        booking_limit_datetime -> Nullable<Timestamptz>,
        is_soft_deleted -> Bool,
        date_modified -> Timestamptz,
    }
}

diesel::table! {
    mediations (id) {
        id -> Uuid,
        offer_id -> Uuid,
        author_id -> Nullable<Uuid>,
        credit -> Nullable<Varchar>,
        thumb_url -> Nullable<Varchar>,
        is_active -> Bool,
        date_created -> Timestamptz,
    }
}

diesel::table! {
    /// Reservations; the `booking_update` trigger enforces stock limits.
    bookings (id) {
        id -> Uuid,
        user_id -> Uuid,
        stock_id -> Uuid,
        token -> Varchar,
        quantity -> Int4,
        amount -> Numeric,
        is_cancelled -> Bool,
        is_used -> Bool,
        date_created -> Timestamptz,
        date_used -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    deposits (id) {
        id -> Uuid,
        user_id -> Uuid,
        amount -> Numeric,
        source -> Varchar,
        date_created -> Timestamptz,
    }
}

diesel::table! {
    payment_messages (name) {
        name -> Varchar,
        checksum -> Varchar,
        date_created -> Timestamptz,
    }
}

diesel::table! {
    payments (id) {
        id -> Uuid,
        booking_id -> Uuid,
        amount -> Numeric,
        reimbursement_rule -> Varchar,
        reimbursement_rate -> Numeric,
        recipient_name -> Varchar,
        recipient_siren -> Varchar,
        iban -> Nullable<Varchar>,
        bic -> Nullable<Varchar>,
        author -> Varchar,
        transaction_label -> Nullable<Varchar>,
        payment_message_name -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Append-only status history of payments.
    payment_statuses (id) {
        id -> Int8,
        payment_id -> Uuid,
        status -> Varchar,
        detail -> Nullable<Varchar>,
        date -> Timestamptz,
    }
}

diesel::joinable!(user_offerers -> users (user_id));
diesel::joinable!(user_offerers -> offerers (offerer_id));
diesel::joinable!(venues -> offerers (managing_offerer_id));
diesel::joinable!(offers -> venues (venue_id));
diesel::joinable!(stocks -> offers (offer_id));
diesel::joinable!(mediations -> offers (offer_id));
diesel::joinable!(bookings -> users (user_id));
diesel::joinable!(bookings -> stocks (stock_id));
diesel::joinable!(deposits -> users (user_id));
diesel::joinable!(payments -> bookings (booking_id));
diesel::joinable!(payment_statuses -> payments (payment_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    offerers,
    user_offerers,
    venues,
    offers,
    stocks,
    mediations,
    bookings,
    deposits,
    payment_messages,
    payments,
    payment_statuses,
);
