mod persistence;
mod properties;
mod scenarios;
