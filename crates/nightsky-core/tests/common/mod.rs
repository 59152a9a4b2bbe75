pub mod paged_server;
