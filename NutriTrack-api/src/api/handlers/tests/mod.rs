mod health_test;
