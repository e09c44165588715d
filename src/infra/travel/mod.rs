pub mod http_travel_matrix;
