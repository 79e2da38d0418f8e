// Diesel table definitions, kept in sync with `migrations/` by hand.

diesel::table! {
    technician (id) {
        id -> Uuid,
        service_id -> Uuid,
        display_name -> Text,
        is_approved -> Bool,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    schedule (id) {
        id -> Uuid,
        technician_id -> Uuid,
        date -> Date,
        address -> Jsonb,
        longitude -> Float8,
        latitude -> Float8,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    schedule_slot (schedule_id, time) {
        schedule_id -> Uuid,
        time -> Timestamptz,
        status -> Text,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    booking_request (id) {
        id -> Uuid,
        schedule_id -> Uuid,
        customer_id -> Uuid,
        time -> Timestamptz,
        address -> Jsonb,
        description -> Text,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    booking (id) {
        id -> Uuid,
        request_id -> Uuid,
        customer_id -> Uuid,
        technician_id -> Uuid,
        service_id -> Uuid,
        customer_address -> Jsonb,
        time -> Timestamptz,
        date -> Date,
        status -> Text,
        description -> Text,
        payment_id -> Nullable<Uuid>,
        review_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    payment (id) {
        id -> Uuid,
        booking_id -> Uuid,
        amount -> Int8,
        currency -> Text,
        mode -> Text,
        status -> Text,
        site_fee -> Nullable<Int8>,
        client_secret -> Nullable<Text>,
        created_at -> Timestamptz,
        completed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    review (id) {
        id -> Uuid,
        booking_id -> Uuid,
        technician_id -> Uuid,
        customer_id -> Uuid,
        rating -> Int4,
        comment -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    outbox_event (id) {
        id -> Uuid,
        event_type -> Text,
        recipient_id -> Uuid,
        payload -> Jsonb,
        attempts -> Int4,
        available_at -> Timestamptz,
        delivered_at -> Nullable<Timestamptz>,
        last_error -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(schedule -> technician (technician_id));
diesel::joinable!(schedule_slot -> schedule (schedule_id));
diesel::joinable!(booking_request -> schedule (schedule_id));
diesel::joinable!(booking -> booking_request (request_id));
diesel::joinable!(payment -> booking (booking_id));
diesel::joinable!(review -> booking (booking_id));

diesel::allow_tables_to_appear_in_same_query!(
    technician,
    schedule,
    schedule_slot,
    booking_request,
    booking,
    payment,
    review,
    outbox_event,
);
