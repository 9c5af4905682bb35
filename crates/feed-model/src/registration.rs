//! Naming of (entity, role) registrations.

/// Lower-cases a role and resolves aliases.
pub fn canonical_role(role: &str) -> String {
    let role = role.trim().to_ascii_lowercase();
    match role.as_str() {
        "emergency" => "emergency_contact".to_string(),
        _ => role,
    }
}

pub fn canonical_entity(entity: &str) -> String {
    entity.trim().to_ascii_lowercase()
}

pub fn registration_label(entity: &str, role: &str) -> String {
    format!("{entity}/{role}")
}
