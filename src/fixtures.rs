#[cfg(test)]
pub mod test {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use crate::value::{Items, into_items};

    /// A small nested tree of controller names.
    pub fn app_items() -> Items {
        into_items(json!({
            "app": {
                "files": "OS::Folders",
                "views": {
                    "home": "HomeViewController",
                    "contact": "ContactViewController"
                },
                "controllers": {
                    "login": "LoginHttpController",
                    "dashboard": "DashboardHttpController"
                }
            }
        }))
    }

    /// A list of product records.
    pub fn records() -> Items {
        into_items(json!([
            {"product": "Desk", "price": 200},
            {"product": "Chair", "price": 100},
            {"product": "Bookcase", "price": 150},
            {"product": "Door", "price": 100}
        ]))
    }

    // -- File contents for import tests ----------------------------------------

    pub const APP_TOML: &str = r#"
title = "dotted"

[database]
host = "localhost"
port = 5432

[database.pool]
size = 5
"#;

    pub const DB_JSON: &str = r#"{
    "models": {"home": "HomeModel", "user": "UserModel"},
    "driver": "sqlite"
}"#;

    pub const TEST_YAML: &str = "\
name: Greg
address:
  city: Vancouver
  country: Canada
tags:
  - one
  - two
";

    // -- Fixture for typed extraction tests ------------------------------------

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct DatabaseSettings {
        pub host: String,
        pub port: u16,
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct AppSettings {
        pub title: String,
        pub database: DatabaseSettings,
    }

    #[test]
    fn records_form_a_list() {
        assert!(crate::value::is_list(&records()));
        assert!(!crate::value::is_list(&app_items()));
    }
}
