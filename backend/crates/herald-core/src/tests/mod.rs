mod log_record;
