//! SQL schema for the Cadastro SQLite store.
//!
//! Executed on every open. There is no migration path: the tables are
//! created if missing and otherwise left alone.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

-- Plan names are stored upper-cased and never updated.
CREATE TABLE IF NOT EXISTS planos (
    id    INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    nome  TEXT UNIQUE NOT NULL CHECK (nome <> '')
);

-- nome + telefone is the lookup key but is deliberately not UNIQUE.
CREATE TABLE IF NOT EXISTS pacientes (
    id        INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    nome      TEXT NOT NULL,
    sexo      TEXT,            -- 'Masculino' | 'Feminino' | NULL; older files hold 'None'
    cartao    TEXT,
    dia_nasc  TEXT,
    mes_nasc  TEXT,
    ano_nasc  TEXT,
    endereco  TEXT,
    cidade    TEXT,
    estado    TEXT,
    cep       TEXT,
    telefone  TEXT NOT NULL,
    celular   TEXT,
    plano_id  INTEGER NOT NULL REFERENCES planos(id)
);

CREATE INDEX IF NOT EXISTS pacientes_nome_idx ON pacientes(nome);

PRAGMA user_version = 1;
";
