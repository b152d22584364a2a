pub mod sample_flows;
