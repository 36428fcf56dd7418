pub mod wrestler_store;
