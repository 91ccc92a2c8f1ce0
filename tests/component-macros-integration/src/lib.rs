//! `service-macros` 的集中测试工程
