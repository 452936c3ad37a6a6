pub const SCHEMA: &str = r#"
-- Users are the principals tags and connections belong to
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Tokens are auth credentials; every token belongs to a user
CREATE TABLE IF NOT EXISTS tokens (
    id TEXT PRIMARY KEY,
    token_hash TEXT NOT NULL,          -- argon2id hash with embedded salt
    token_lookup TEXT NOT NULL,        -- first 8 chars of ID for fast lookup
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,

    -- Lifecycle
    created_at TEXT DEFAULT (datetime('now')),
    expires_at TEXT,            -- NULL = never
    last_used_at TEXT
);

-- Physical NFC tags
CREATE TABLE IF NOT EXISTS tags (
    id TEXT PRIMARY KEY,
    tag_uid TEXT NOT NULL UNIQUE,
    public_code TEXT NOT NULL UNIQUE,
    owner_id TEXT REFERENCES users(id),

    -- Binding: both NULL, or both set (one module of one kind)
    module_type TEXT CHECK (module_type IN ('card', 'plant', 'mug', 'gift', 'page')),
    module_id TEXT,

    status TEXT NOT NULL DEFAULT 'unclaimed' CHECK (status IN ('unclaimed', 'claimed', 'available')),
    claimed_at TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now')),

    CHECK ((module_type IS NULL) = (module_id IS NULL)),
    CHECK (status = 'claimed' OR (owner_id IS NULL AND module_type IS NULL))
);

-- Modules: one table per kind, each with an optional back-reference to its tag
CREATE TABLE IF NOT EXISTS cards (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    tag_id TEXT REFERENCES tags(id) ON DELETE SET NULL,

    -- Viewer gates (plaintext, card-scoped)
    password TEXT,
    level1_password TEXT,
    level2_password TEXT,

    view_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS plants (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    tag_id TEXT REFERENCES tags(id) ON DELETE SET NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS mugs (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    tag_id TEXT REFERENCES tags(id) ON DELETE SET NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS gifts (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    tag_id TEXT REFERENCES tags(id) ON DELETE SET NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS pages (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    tag_id TEXT REFERENCES tags(id) ON DELETE SET NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Saved contacts: a user saved a card, or another user directly
CREATE TABLE IF NOT EXISTS connections (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    card_id TEXT REFERENCES cards(id) ON DELETE CASCADE,
    friend_id TEXT REFERENCES users(id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'saved' CHECK (status IN ('saved', 'pending')),
    visibility TEXT NOT NULL DEFAULT 'private' CHECK (visibility IN ('private', 'public')),
    created_at TEXT DEFAULT (datetime('now')),

    CHECK ((card_id IS NULL) <> (friend_id IS NULL))
);

-- Create indexes
CREATE UNIQUE INDEX IF NOT EXISTS idx_tokens_lookup ON tokens(token_lookup);
CREATE INDEX IF NOT EXISTS idx_tokens_user ON tokens(user_id);
CREATE INDEX IF NOT EXISTS idx_tags_owner ON tags(owner_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_cards_tag ON cards(tag_id) WHERE tag_id IS NOT NULL;
CREATE UNIQUE INDEX IF NOT EXISTS idx_plants_tag ON plants(tag_id) WHERE tag_id IS NOT NULL;
CREATE UNIQUE INDEX IF NOT EXISTS idx_mugs_tag ON mugs(tag_id) WHERE tag_id IS NOT NULL;
CREATE UNIQUE INDEX IF NOT EXISTS idx_gifts_tag ON gifts(tag_id) WHERE tag_id IS NOT NULL;
CREATE UNIQUE INDEX IF NOT EXISTS idx_pages_tag ON pages(tag_id) WHERE tag_id IS NOT NULL;
CREATE INDEX IF NOT EXISTS idx_cards_owner ON cards(owner_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_connections_user_card
    ON connections(user_id, card_id) WHERE card_id IS NOT NULL;
CREATE UNIQUE INDEX IF NOT EXISTS idx_connections_user_friend
    ON connections(user_id, friend_id) WHERE friend_id IS NOT NULL;
"#;
