use json_schema_struct::{
    Describe, EnumDescription, FieldDescription, FieldType, StructDescription, convert_schema,
    convert_schema_with_name, schema_for,
};

struct Verdict;

impl Describe for Verdict {
    fn describe() -> FieldType {
        FieldType::Struct(
            StructDescription::new("Verdict")
                .field(FieldDescription::of::<String>("summary").with_description("One-line summary"))
                .field(FieldDescription::new(
                    "severity",
                    FieldType::Enum(EnumDescription::new("Severity", ["low", "medium", "high"])),
                ))
                .field(FieldDescription::of::<Option<Vec<String>>>("follow_ups"))
                .field(FieldDescription::of::<u64>("request_id").skipped()),
        )
    }
}

fn main() {
    // Example 1: Simple object
    let schema1 = r#"{
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "age": { "type": "integer", "exclusiveMinimum": 0 },
            "email": { "type": "string", "format": "email" }
        },
        "required": ["name", "email"]
    }"#;

    println!("=== Example 1: Simple Object ===");
    println!("{}\n", convert_schema(schema1).unwrap());

    // Example 2: Enums, arrays and nested records
    let schema2 = r#"{
        "type": "object",
        "properties": {
            "config": {
                "type": "object",
                "properties": {
                    "theme": { "type": "string", "enum": ["light", "dark", "auto"] },
                    "notifications": {
                        "type": "object",
                        "properties": {
                            "email": { "type": "boolean" },
                            "push": { "type": "boolean" }
                        }
                    }
                }
            },
            "tags": { "type": "array", "items": { "type": "string" } }
        }
    }"#;

    println!("=== Example 2: Nested Records ===");
    println!("{}\n", convert_schema_with_name(schema2, "Settings").unwrap());

    // Example 3: References and nullable unions
    let schema3 = r##"{
        "type": "object",
        "properties": {
            "author": { "$ref": "#/$defs/User" },
            "reviewer": { "anyOf": [{ "$ref": "#/$defs/User" }, { "type": "null" }] },
            "score": { "type": ["number", "string", "null"] }
        },
        "required": ["author", "reviewer", "score"],
        "$defs": {
            "User": {
                "type": "object",
                "properties": {
                    "id": { "type": "integer" },
                    "username": { "type": "string" }
                },
                "required": ["id", "username"]
            }
        }
    }"##;

    println!("=== Example 3: References ===");
    println!("{}\n", convert_schema_with_name(schema3, "Review").unwrap());

    // Example 4: Struct description to a structured-output schema
    println!("=== Example 4: Struct to Schema ===");
    let schema = schema_for::<Verdict>().unwrap();
    println!("{}", serde_json::to_string_pretty(&schema).unwrap());
}
