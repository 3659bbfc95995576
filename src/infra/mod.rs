pub mod ndjson_sink;
pub mod supabase_rest;
