pub mod errors;
pub mod db;
pub mod bill;

#[cfg(test)]
mod tests;
