//! `di-impl` 的集中测试工程
