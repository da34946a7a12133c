pub mod districts;
