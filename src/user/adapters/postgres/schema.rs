//! Diesel schema for user persistence.

diesel::table! {
    /// User records.
    users (id) {
        /// Storage-assigned user identifier.
        id -> Int8,
        /// Unique user name.
        #[max_length = 255]
        name -> Varchar,
        /// Pre-computed password hash.
        #[max_length = 255]
        password_hash -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
