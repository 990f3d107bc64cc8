//! Diesel schema for task persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Storage-assigned task identifier.
        id -> Int8,
        /// Unique task name.
        #[max_length = 30]
        name -> Varchar,
        /// Free-form description.
        description -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One status record per task.
    task_statuses (task_id) {
        /// Owning task.
        task_id -> Int8,
        /// Canonical status tag.
        #[max_length = 20]
        status_name -> Varchar,
    }
}

diesel::table! {
    /// Label records, indexed by owning task.
    task_labels (id) {
        /// Label row identifier; ascending ids give insertion order.
        id -> Int8,
        /// Owning task.
        task_id -> Int8,
        /// Label text.
        #[max_length = 15]
        label_name -> Varchar,
    }
}

diesel::joinable!(task_statuses -> tasks (task_id));
diesel::joinable!(task_labels -> tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(tasks, task_statuses, task_labels);
