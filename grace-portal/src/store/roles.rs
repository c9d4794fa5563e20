use super::{RoleTable, UserStore};

/// Role names tried, in order, when a new account does not ask for one.
pub const DEFAULT_ROLE_NAMES: &[&str] = &["Cliente", "Usuario"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

/// Picks the default role: "Cliente", then "Usuario" (both case-insensitive),
/// then the smallest id. `None` for an empty list.
pub fn pick_default(roles: &[Role]) -> Option<&Role> {
    DEFAULT_ROLE_NAMES
        .iter()
        .find_map(|wanted| {
            roles
                .iter()
                .filter(|role| role.name.trim().eq_ignore_ascii_case(wanted))
                .min_by_key(|role| role.id)
        })
        .or_else(|| roles.iter().min_by_key(|role| role.id))
}

/// Resolves a role hint from the registration form: a numeric hint is taken
/// as an id when such a role exists (or when the role list is unknown), any
/// other hint is matched against role names.
pub fn pick_hinted(roles: &[Role], hint: &str) -> Option<i64> {
    let hint = hint.trim();
    if hint.is_empty() {
        return None;
    }
    if let Ok(id) = hint.parse::<i64>() {
        if roles.is_empty() || roles.iter().any(|role| role.id == id) {
            return Some(id);
        }
        return None;
    }
    roles
        .iter()
        .find(|role| role.name.trim().eq_ignore_ascii_case(hint))
        .map(|role| role.id)
}

/// Role id for an optional hint, falling back to the default role.
///
/// `None` when the role table is missing, empty or unreadable. Absence is a
/// normal outcome: the insert then goes ahead without a role value. The read
/// runs in a savepoint so a failed lookup does not abort the caller's
/// transaction.
pub fn resolve<S: UserStore>(store: &mut S, table: Option<&RoleTable>, hint: Option<&str>) -> Option<i64> {
    let roles = load(store, table);
    if let Some(id) = hint.and_then(|h| pick_hinted(&roles, h)) {
        return Some(id);
    }
    if let Some(hint) = hint.filter(|h| !h.trim().is_empty()) {
        tracing::debug!(hint, "role hint not recognised, using default role");
    }
    pick_default(&roles).map(|role| role.id)
}

fn load<S: UserStore>(store: &mut S, table: Option<&RoleTable>) -> Vec<Role> {
    let Some(table) = table else {
        return Vec::new();
    };
    store.savepoint(|store| store.roles(table)).unwrap_or_else(|e| {
        tracing::warn!(error = %e, table = %table.table, "role lookup failed");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: i64, name: &str) -> Role {
        Role { id, name: name.to_string() }
    }

    #[test]
    fn cliente_wins() {
        let roles = vec![role(1, "Administrador"), role(2, "Usuario"), role(3, "cliente")];
        assert_eq!(pick_default(&roles).map(|r| r.id), Some(3));
    }

    #[test]
    fn usuario_is_second_choice() {
        let roles = vec![role(1, "Administrador"), role(5, "USUARIO")];
        assert_eq!(pick_default(&roles).map(|r| r.id), Some(5));
    }

    #[test]
    fn smallest_id_is_last_resort() {
        let roles = vec![role(9, "Recepcion"), role(4, "Administrador"), role(7, "Limpieza")];
        assert_eq!(pick_default(&roles).map(|r| r.id), Some(4));
    }

    #[test]
    fn empty_roles_have_no_default() {
        assert_eq!(pick_default(&[]), None);
    }

    #[test]
    fn numeric_hint_must_exist() {
        let roles = vec![role(1, "Administrador"), role(2, "Cliente")];
        assert_eq!(pick_hinted(&roles, "1"), Some(1));
        assert_eq!(pick_hinted(&roles, "42"), None);
        assert_eq!(pick_hinted(&[], "42"), Some(42));
    }

    #[test]
    fn named_hint_matches_case_insensitively() {
        let roles = vec![role(1, "Administrador"), role(2, "Cliente")];
        assert_eq!(pick_hinted(&roles, "cliente"), Some(2));
        assert_eq!(pick_hinted(&roles, "gerente"), None);
        assert_eq!(pick_hinted(&roles, " "), None);
    }
}
