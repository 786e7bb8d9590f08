//! Table definitions, applied idempotently at connect time.
//!
//! Order matters: foreign-key targets must exist before their
//! dependents (users -> ingredients -> inventory -> conversions ->
//! recipes -> recipe_ingredients).

/// Subsecond UTC timestamps so consecutive writes stay ordered.
pub(crate) const NOW: &str = "STRFTIME('%Y-%m-%dT%H:%M:%fZ','now')";

const USERS: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT UNIQUE NOT NULL,
    hashed_pw TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ','now')),
    updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ','now'))
);";

const INGREDIENTS: &str = "CREATE TABLE IF NOT EXISTS ingredients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL,
    category TEXT NOT NULL,
    unit_type TEXT NOT NULL
);";

const INVENTORY: &str = "CREATE TABLE IF NOT EXISTS inventory (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    ingredient_id INTEGER NOT NULL,
    quantity REAL NOT NULL CHECK (quantity >= 0),
    minimum_threshold REAL NOT NULL CHECK (minimum_threshold >= 0),
    expiration_date TEXT,
    created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ','now')),
    updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ','now')),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (ingredient_id) REFERENCES ingredients(id) ON DELETE CASCADE,
    UNIQUE(user_id, ingredient_id)
);";

const CONVERSIONS: &str = "CREATE TABLE IF NOT EXISTS conversions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ingredient_id INTEGER NOT NULL,
    measurement_unit TEXT NOT NULL,
    quantity_in_standard_unit REAL NOT NULL,
    FOREIGN KEY (ingredient_id) REFERENCES ingredients(id) ON UPDATE CASCADE,
    UNIQUE(ingredient_id, measurement_unit)
);";

const RECIPES: &str = "CREATE TABLE IF NOT EXISTS recipes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    servings INTEGER DEFAULT 1,
    prep_time_minutes INTEGER,
    created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ','now')),
    updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ','now')),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);";

const RECIPE_INGREDIENTS: &str = "CREATE TABLE IF NOT EXISTS recipe_ingredients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    recipe_id INTEGER NOT NULL,
    ingredient_id INTEGER NOT NULL,
    quantity REAL NOT NULL,
    unit TEXT NOT NULL,
    notes TEXT,
    FOREIGN KEY (recipe_id) REFERENCES recipes(id) ON DELETE CASCADE,
    FOREIGN KEY (ingredient_id) REFERENCES ingredients(id) ON DELETE CASCADE
);";

/// All tables in application order.
pub(crate) const TABLES: &[(&str, &str)] = &[
    ("users", USERS),
    ("ingredients", INGREDIENTS),
    ("inventory", INVENTORY),
    ("conversions", CONVERSIONS),
    ("recipes", RECIPES),
    ("recipe_ingredients", RECIPE_INGREDIENTS),
];
