pub mod obtain_token_cmd;
