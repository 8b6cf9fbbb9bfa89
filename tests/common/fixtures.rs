use serde_json::{Value, json};

/// Source project: parcels referencing owners.
pub fn source_project() -> Value {
    json!({
        "file_name": "/data/city.qgz",
        "layers": [
            {"id": "parcels_20240101", "name": "parcels", "source": "dbname='gis' table=parcels (geom)", "fields": ["fid", "owner_id", "area"]},
            {"id": "owners_20240101", "name": "owners", "source": "table=owners", "fields": ["id", "name"]}
        ],
        "relations": [
            {
                "id": "parcel_owner",
                "name": "Parcel owner",
                "strength": "Composition",
                "referencing_layer": "parcels_20240101",
                "referenced_layer": "owners_20240101",
                "referencing_fields": ["owner_id"],
                "referenced_fields": ["id"]
            }
        ]
    })
}

/// Target project: same tables, different layer ids and display names.
pub fn target_project() -> Value {
    json!({
        "layers": [
            {"id": "Parcels_a1", "name": "Parcels", "source": "table=parcels", "fields": ["fid", "owner_id", "area"]},
            {"id": "Owners_b2", "name": "Owners", "source": "table=owners", "fields": ["id", "name"]}
        ],
        "relations": []
    })
}

pub fn to_text(value: &Value) -> String {
    serde_json::to_string_pretty(value).expect("serialize fixture")
}
