#![allow(dead_code)]

use switchyard::{BoxError, Collector, controller};

// ============================================================================
// Test Targets
// ============================================================================

pub struct UserController;

#[controller]
impl UserController {
    pub fn get_index(&self) -> String {
        self.greeting().to_string()
    }

    pub fn get_show(&self, id: u32, #[param(default = "html")] format: String) -> String {
        format!("user {id} as {format}")
    }

    pub fn post_rename(&self, id: u32, name: Option<String>) -> Result<String, BoxError> {
        match name {
            Some(name) => Ok(format!("user {id} renamed to {name}")),
            None => Err("a new name is required".into()),
        }
    }

    pub fn get_page(&self, #[param(regex = "[a-z]+")] slug: String, offset: i64) -> String {
        format!("{slug}@{offset}")
    }

    pub fn build() -> Self {
        UserController
    }

    fn greeting(&self) -> &'static str {
        "all users"
    }
}

pub struct Photos {
    pub owner: String,
}

#[controller(name = "PhotoController")]
impl Photos {
    pub fn index(&self) -> String {
        format!("{}'s photos", self.owner)
    }

    pub fn show(&self, id: u64) -> String {
        format!("photo {id}")
    }

    pub fn update(&self, id: u64) -> Result<String, std::num::ParseIntError> {
        let checked: u64 = id.to_string().parse()?;
        Ok(format!("updated {checked}"))
    }
}

pub struct Health;

#[controller(output = &'static str)]
impl Health {
    pub fn get(&self) -> &'static str {
        "ok"
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Every registered route as `"method pattern"`, sorted.
pub fn registered<R>(routes: &Collector<R>) -> Vec<String> {
    let mut out: Vec<String> = routes
        .table()
        .methods()
        .flat_map(|m| {
            routes
                .table()
                .routes(m)
                .map(move |r| format!("{m} {}", r.raw_pattern()))
        })
        .collect();
    out.sort();
    out
}
