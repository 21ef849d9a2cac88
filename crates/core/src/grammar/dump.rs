use super::schema::LiquidSchema;

/// Serialize a schema to a pretty-printed JSON string.
pub fn to_pretty_json(schema: &LiquidSchema) -> String {
    serde_json::to_string_pretty(schema).expect("LiquidSchema serialization cannot fail")
}
