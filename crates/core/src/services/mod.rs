pub mod stock_repository;
