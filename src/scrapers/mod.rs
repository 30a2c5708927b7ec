pub mod veribet;
